/// Value returned for anything that is not a dotted-decimal IPv4 address.
pub const INVALID_IP4: i64 = -1;

/// Convert a dotted-decimal IPv4 address to its 32-bit integer value.
///
/// The input is split on `.` and must produce exactly four segments, each a
/// decimal integer in `0..=255`. Anything else, including a null input,
/// yields [`INVALID_IP4`].
///
/// ```
/// assert_eq!(ipgeo::ip4_to_integer(Some("192.168.1.10")), 3232235786);
/// assert_eq!(ipgeo::ip4_to_integer(Some("312-414-5597")), -1);
/// assert_eq!(ipgeo::ip4_to_integer(None), -1);
/// ```
pub fn ip4_to_integer(address: Option<&str>) -> i64 {
    let Some(address) = address else {
        return INVALID_IP4;
    };

    let mut value: i64 = 0;
    let mut segments = 0;
    for segment in address.split('.') {
        segments += 1;
        if segments > 4 {
            return INVALID_IP4;
        }
        // Parsed wide so that "-0" and "+7" behave like any signed decimal
        // and oversized segments fail the range check instead of overflowing.
        let octet = match segment.parse::<i64>() {
            Ok(octet) if (0..=255).contains(&octet) => octet,
            _ => return INVALID_IP4,
        };
        value = (value << 8) | octet;
    }

    if segments == 4 {
        value
    } else {
        INVALID_IP4
    }
}
