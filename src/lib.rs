//! IP address enrichment functions for per-row evaluation by a query engine.
//!
//! Two functions are provided:
//!
//! - [`ip4_to_integer`] turns a dotted-decimal IPv4 address into its 32-bit
//!   integer value, or `-1`.
//! - [`ip_to_geo`] returns the country, subdivision, city or location of an
//!   IP address from a GeoIP2 City database.
//!
//! The database is opened lazily, once per process, the first time a lookup
//! needs it, and is then shared read-only by every thread. Rows whose
//! address is malformed or not covered by the database produce an empty
//! string rather than an error, so one bad row never fails a batch.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ipgeo::{ip4_to_integer, ip_to_geo};
//!
//! assert_eq!(ip4_to_integer(Some("192.168.1.10")), 3232235786);
//!
//! // Reads $GEOIP_MMDB_DIR/GeoIP2-City.mmdb on first use.
//! let country = ip_to_geo(Some("country"), Some("81.2.69.160"), None)?;
//! let location = ip_to_geo(Some("location"), Some("81.2.69.160"), None)?;
//! # Ok::<(), ipgeo::Error>(())
//! ```
//!
//! Hosts that drive the functions through an initialize/evaluate protocol
//! can use the [`udf`] module instead.

pub mod address;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod geo_trait;
pub mod input;
pub mod ip4;
pub mod lookup;
pub mod udf;

pub use crate::address::Address;
pub use crate::cache::{DatabaseCache, Handle, GEO_DATABASE};
pub use crate::config::{DatabasePath, GeoConfig, DATABASE_FILENAME};
pub use crate::database::{GeoDatabase, GeoRecord, MaxMindDatabase};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::geo_trait::GeoTrait;
pub use crate::ip4::{ip4_to_integer, INVALID_IP4};
pub use crate::lookup::{ip_to_geo, GeoLookup};
