use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use camino::Utf8Path;
use maxminddb::{Mmap, Reader};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Geographic attributes decoded for one address.
///
/// Every field is independently optional. Absence is kept as `None` here and
/// only becomes an empty string when a trait is rendered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeoRecord {
    pub country: Option<String>,
    /// Name of the most specific subdivision.
    pub subdivision: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A read-only geo database that can be opened from a path and queried from
/// many threads at once.
pub trait GeoDatabase: Send + Sync + Sized {
    /// Open and parse the database file at `path`.
    fn open(path: &Utf8Path) -> Result<Self>;

    /// Look up `ip`, picking names in `locale`.
    ///
    /// `Ok(None)` means the database has no coverage for the address. Any
    /// other failure is an `Err`.
    fn lookup(&self, ip: IpAddr, locale: &str) -> Result<Option<GeoRecord>>;
}

// Subset of the GeoIP2 City record layout that we read. Unknown keys are
// skipped by the decoder.
#[derive(Deserialize)]
struct CityRecord<'a> {
    #[serde(borrow)]
    city: Option<Place<'a>>,
    #[serde(borrow)]
    country: Option<Place<'a>>,
    location: Option<Location>,
    #[serde(borrow, default)]
    subdivisions: Vec<Place<'a>>,
}

#[derive(Deserialize)]
struct Place<'a> {
    #[serde(borrow)]
    names: Option<BTreeMap<&'a str, &'a str>>,
}

#[derive(Deserialize)]
struct Location {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl Place<'_> {
    fn name(&self, locale: &str) -> Option<String> {
        self.names
            .as_ref()
            .and_then(|names| names.get(locale))
            .map(|name| (*name).to_string())
    }
}

impl CityRecord<'_> {
    fn into_record(self, locale: &str) -> GeoRecord {
        let (latitude, longitude) = match self.location {
            Some(location) => (location.latitude, location.longitude),
            None => (None, None),
        };
        GeoRecord {
            country: self.country.and_then(|place| place.name(locale)),
            subdivision: self
                .subdivisions
                .last()
                .and_then(|place| place.name(locale)),
            city: self.city.and_then(|place| place.name(locale)),
            latitude,
            longitude,
        }
    }
}

/// GeoIP2/GeoLite2 City database, memory-mapped.
///
/// `maxminddb::Reader` only takes `&self` for lookups, so one instance serves
/// any number of threads without locking.
pub struct MaxMindDatabase {
    reader: Reader<Mmap>,
}

impl fmt::Debug for MaxMindDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxMindDatabase").finish_non_exhaustive()
    }
}

impl MaxMindDatabase {
    /// The form of `ip` this database can be searched with.
    ///
    /// An IPv4-only database has no IPv6 networks: IPv4-mapped addresses are
    /// searched as IPv4 and any other IPv6 address is simply not covered.
    fn searchable(&self, ip: IpAddr) -> Option<IpAddr> {
        match ip.to_canonical() {
            IpAddr::V6(_) if self.reader.metadata.ip_version == 4 => None,
            ip => Some(ip),
        }
    }
}

impl GeoDatabase for MaxMindDatabase {
    fn open(path: &Utf8Path) -> Result<Self> {
        // SAFETY: the file is mapped read-only and nothing in this process
        // writes to it while the reader is alive.
        let reader = unsafe { Reader::open_mmap(path) }.map_err(|e| Error::DatabaseOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Ok(Self { reader })
    }

    fn lookup(&self, ip: IpAddr, locale: &str) -> Result<Option<GeoRecord>> {
        let failed = |e: maxminddb::MaxMindDbError| Error::LookupFailed {
            ip: ip.to_string(),
            source: Box::new(e),
        };
        let Some(ip) = self.searchable(ip) else {
            return Ok(None);
        };
        let result = self.reader.lookup(ip).map_err(failed)?;
        let record: Option<CityRecord<'_>> = result.decode().map_err(failed)?;
        Ok(record.map(|record| record.into_record(locale)))
    }
}
