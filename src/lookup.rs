use once_cell::sync::Lazy;
use tracing::trace;

use crate::address::Address;
use crate::cache::{DatabaseCache, GEO_DATABASE};
use crate::config::{DatabasePath, GeoConfig};
use crate::database::{GeoDatabase, MaxMindDatabase};
use crate::error::{Error, Result};
use crate::geo_trait::GeoTrait;

/// Per-row geo lookups against a shared [`DatabaseCache`].
///
/// No state is kept between calls other than the handle inside the cache,
/// so one `GeoLookup` can be used from any number of threads.
#[derive(Debug)]
pub struct GeoLookup<'c, D> {
    cache: &'c DatabaseCache<D>,
    config: GeoConfig,
}

static GLOBAL: Lazy<GeoLookup<'static, MaxMindDatabase>> =
    Lazy::new(|| GeoLookup::new(&GEO_DATABASE, GeoConfig::global().clone()));

impl GeoLookup<'static, MaxMindDatabase> {
    /// Lookups against the process-wide database, configured from the
    /// environment.
    pub fn global() -> &'static Self {
        &GLOBAL
    }
}

impl<'c, D: GeoDatabase> GeoLookup<'c, D> {
    pub fn new(cache: &'c DatabaseCache<D>, config: GeoConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &GeoConfig {
        &self.config
    }

    /// Look up one attribute of one address.
    ///
    /// The trait is checked before anything else, so an unsupported trait is
    /// an error whatever the address. An address that does not parse, or that
    /// the database does not cover, gives an empty string. Failing to open
    /// or query the database is an error.
    pub fn evaluate(
        &self,
        geo_trait: Option<&str>,
        address: Option<&str>,
        path_override: Option<&str>,
    ) -> Result<String> {
        let geo_trait: GeoTrait = geo_trait.ok_or(Error::MissingTrait)?.parse()?;
        self.lookup(geo_trait, address, path_override)
    }

    /// [`GeoLookup::evaluate`] with an already parsed trait.
    pub fn lookup(
        &self,
        geo_trait: GeoTrait,
        address: Option<&str>,
        path_override: Option<&str>,
    ) -> Result<String> {
        let Some(address) = Address::parse(address) else {
            return Ok(String::new());
        };

        let path = DatabasePath::resolve(&self.config, path_override);
        let handle = self.cache.ensure(&path)?;

        match handle.database().lookup(address.ip(), &self.config.locale) {
            Ok(Some(record)) => Ok(geo_trait.extract(&record)),
            Ok(None) => {
                trace!(ip = %address, "address not covered by geo database");
                Ok(String::new())
            }
            Err(Error::LookupFailed { source, .. }) => Err(Error::LookupFailed {
                ip: address.text().to_string(),
                source,
            }),
            Err(err) => Err(err),
        }
    }
}

/// Look up `geo_trait` (`country`, `subdivision`, `city` or `location`) for
/// `address` using the process-wide database.
///
/// `path_override` replaces the configured base directory, but only the
/// first successful open counts: once the database is loaded it is reused
/// for the rest of the process no matter which directory later calls name.
pub fn ip_to_geo(
    geo_trait: Option<&str>,
    address: Option<&str>,
    path_override: Option<&str>,
) -> Result<String> {
    GeoLookup::global().evaluate(geo_trait, address, path_override)
}
