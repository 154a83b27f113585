use std::fmt;
use std::str::FromStr;

use crate::database::GeoRecord;
use crate::error::Error;

/// The geographic attribute a lookup returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeoTrait {
    Country,
    Subdivision,
    City,
    /// `"<latitude>,<longitude>"`.
    Location,
}

impl GeoTrait {
    pub const ALL: [GeoTrait; 4] = [
        GeoTrait::Country,
        GeoTrait::Subdivision,
        GeoTrait::City,
        GeoTrait::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoTrait::Country => "country",
            GeoTrait::Subdivision => "subdivision",
            GeoTrait::City => "city",
            GeoTrait::Location => "location",
        }
    }

    /// Render this attribute of `record`. Absent fields become empty strings.
    pub fn extract(&self, record: &GeoRecord) -> String {
        match self {
            GeoTrait::Country => record.country.clone().unwrap_or_default(),
            GeoTrait::Subdivision => record.subdivision.clone().unwrap_or_default(),
            GeoTrait::City => record.city.clone().unwrap_or_default(),
            GeoTrait::Location => format_location(record.latitude, record.longitude),
        }
    }
}

impl FromStr for GeoTrait {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "country" => Ok(GeoTrait::Country),
            "subdivision" => Ok(GeoTrait::Subdivision),
            "city" => Ok(GeoTrait::City),
            "location" => Ok(GeoTrait::Location),
            other => Err(Error::UnsupportedTrait {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for GeoTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The comma is always written so partial coordinates keep their position.
fn format_location(latitude: Option<f64>, longitude: Option<f64>) -> String {
    let mut buf = ryu::Buffer::new();
    let mut out = String::with_capacity(24);
    if let Some(latitude) = latitude {
        out.push_str(buf.format(latitude));
    }
    out.push(',');
    if let Some(longitude) = longitude {
        out.push_str(buf.format(longitude));
    }
    out
}
