//! Scalar functions as a query engine sees them.
//!
//! A host first calls [`ScalarFunction::initialize`] once with the declared
//! argument types, which rejects bad arity or types before any row is read,
//! and then [`ScalarFunction::evaluate`] once per row.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::database::{GeoDatabase, MaxMindDatabase};
use crate::error::{Error, Result};
use crate::ip4::ip4_to_integer;
use crate::lookup::GeoLookup;

/// A value handed to or returned from a scalar function.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<'a> {
    Null,
    Long(i64),
    Text(Cow<'a, str>),
}

impl<'a> Value<'a> {
    pub fn text(s: impl Into<Cow<'a, str>>) -> Self {
        Value::Text(s.into())
    }

    /// The string content, with `Null` mapped to `None`.
    ///
    /// Non-text values never reach this point once `initialize` accepted the
    /// argument types; they are treated like `Null`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_ref()),
            Value::Null | Value::Long(_) => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Long(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Declared type of a function argument.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArgType {
    String,
    Long,
    Other(&'static str),
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::String => f.write_str("string"),
            ArgType::Long => f.write_str("bigint"),
            ArgType::Other(name) => f.write_str(name),
        }
    }
}

/// Help text for a function, for listing in a host's catalog.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDescription {
    pub name: &'static str,
    pub usage: &'static str,
    pub example: &'static str,
}

/// A deterministic function evaluated once per row.
pub trait ScalarFunction: Send + Sync {
    fn description(&self) -> FunctionDescription;

    /// Check the declared argument types.
    fn initialize(&self, args: &[ArgType]) -> Result<()>;

    /// Compute the result for one row.
    fn evaluate(&self, args: &[Value<'_>]) -> Result<Value<'static>>;

    /// How the call is shown in query plans.
    fn display_string(&self, children: &[&str]) -> String {
        format!(
            "{}({})",
            self.description().name,
            children.first().copied().unwrap_or_default()
        )
    }
}

fn check_strings(function: &'static str, args: &[ArgType]) -> Result<()> {
    for (i, arg) in args.iter().enumerate() {
        if *arg != ArgType::String {
            return Err(Error::InvalidArgumentType {
                function,
                position: i + 1,
                found: arg.to_string(),
            });
        }
    }
    Ok(())
}

/// `ip4_to_bigint(address)`: the integer value of a dotted-decimal IPv4
/// address, or -1.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ip4ToBigInt;

impl Ip4ToBigInt {
    const NAME: &'static str = "ip4_to_bigint";
}

impl ScalarFunction for Ip4ToBigInt {
    fn description(&self) -> FunctionDescription {
        FunctionDescription {
            name: Self::NAME,
            usage: "Returns the integer conversion of an IPv4 address (string), or -1.",
            example: "SELECT ip4_to_bigint('192.168.1.10'); -- 3232235786",
        }
    }

    fn initialize(&self, args: &[ArgType]) -> Result<()> {
        if args.len() != 1 {
            return Err(Error::InvalidArity {
                function: Self::NAME,
                expected: "exactly one argument: IP address",
                found: args.len(),
            });
        }
        check_strings(Self::NAME, args)
    }

    fn evaluate(&self, args: &[Value<'_>]) -> Result<Value<'static>> {
        let address = args.first().and_then(Value::as_str);
        Ok(Value::Long(ip4_to_integer(address)))
    }
}

/// `ip_to_geo(trait, address [, database_dir])`: a geographic attribute of
/// an IP address.
#[derive(Debug)]
pub struct IpToGeo<'l, D> {
    lookup: &'l GeoLookup<'l, D>,
}

impl IpToGeo<'static, MaxMindDatabase> {
    /// The function bound to the process-wide database.
    pub fn global() -> Self {
        Self::new(GeoLookup::global())
    }
}

impl<'l, D> IpToGeo<'l, D> {
    const NAME: &'static str = "ip_to_geo";

    pub fn new(lookup: &'l GeoLookup<'l, D>) -> Self {
        Self { lookup }
    }

    fn check_arity(found: usize) -> Result<()> {
        if (2..=3).contains(&found) {
            return Ok(());
        }
        Err(Error::InvalidArity {
            function: Self::NAME,
            expected: "these arguments: geo trait, IP address, [and optionally database path]",
            found,
        })
    }
}

impl<'l, D: GeoDatabase> ScalarFunction for IpToGeo<'l, D> {
    fn description(&self) -> FunctionDescription {
        FunctionDescription {
            name: Self::NAME,
            usage: "Returns the geographical information of an IP address (string). \
                    The trait can be country, subdivision, city, or location; \
                    an optional third argument overrides the database directory.",
            example: "SELECT ip_to_geo('country', '81.2.69.160');",
        }
    }

    fn initialize(&self, args: &[ArgType]) -> Result<()> {
        Self::check_arity(args.len())?;
        check_strings(Self::NAME, args)
    }

    fn evaluate(&self, args: &[Value<'_>]) -> Result<Value<'static>> {
        Self::check_arity(args.len())?;
        let geo_trait = args[0].as_str();
        let address = args[1].as_str();
        let path_override = args.get(2).and_then(Value::as_str);
        let value = self.lookup.evaluate(geo_trait, address, path_override)?;
        Ok(Value::Text(Cow::Owned(value)))
    }
}
