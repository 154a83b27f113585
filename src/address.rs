use std::fmt;
use std::net::IpAddr;

/// A validated IP address: the text the caller supplied plus its parsed form.
///
/// Only [`Address::parse`] builds one, so holding an `Address` means the
/// text was accepted by the standard IPv4/IPv6 literal parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address<'a> {
    text: &'a str,
    ip: IpAddr,
}

impl<'a> Address<'a> {
    /// Validate an address taken from a row.
    ///
    /// Returns `None` for null, empty or malformed input. Surrounding
    /// whitespace is not trimmed; hosts hand us the column value verbatim
    /// and `" 1.2.3.4"` is not an address literal. Hostnames are never
    /// resolved.
    #[inline]
    pub fn parse(input: Option<&'a str>) -> Option<Address<'a>> {
        let text = input?;
        let ip = text.parse::<IpAddr>().ok()?;
        Some(Address { text, ip })
    }

    /// The text as supplied by the caller.
    #[inline]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[inline]
    pub fn ip(&self) -> IpAddr {
        self.ip
    }
}

impl fmt::Display for Address<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}
