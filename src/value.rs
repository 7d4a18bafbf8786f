//! Conversions between keyword arguments and typed SNMP values.

use std::net::Ipv4Addr;

use async_snmp::{Oid, Value};
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::oid::format_numeric_oid;

/// Scalar keyword argument before it is given an SNMP type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueInput {
    Text(String),
    Integer(i64),
    /// List of small integers, e.g. the four octets of an IP address.
    List(Vec<i64>),
}

impl From<&str> for ValueInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ValueInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for ValueInput {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for ValueInput {
    fn from(n: i32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<u32> for ValueInput {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<Vec<i64>> for ValueInput {
    fn from(items: Vec<i64>) -> Self {
        Self::List(items)
    }
}

impl std::fmt::Display for ValueInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(n) => write!(f, "{}", n),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(i64::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Value given to a SET keyword.
///
/// Typed values are sent as-is. Untyped values are converted using the MIB
/// syntax of the target object when one is known.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    Typed(Value),
    Untyped(ValueInput),
}

impl From<Value> for SetValue {
    fn from(value: Value) -> Self {
        Self::Typed(value)
    }
}

impl From<ValueInput> for SetValue {
    fn from(input: ValueInput) -> Self {
        Self::Untyped(input)
    }
}

impl From<&str> for SetValue {
    fn from(text: &str) -> Self {
        Self::Untyped(text.into())
    }
}

impl From<String> for SetValue {
    fn from(text: String) -> Self {
        Self::Untyped(text.into())
    }
}

impl From<i64> for SetValue {
    fn from(n: i64) -> Self {
        Self::Untyped(n.into())
    }
}

impl std::fmt::Display for SetValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Typed(value) => f.write_str(&render_value(value)),
            Self::Untyped(input) => input.fmt(f),
        }
    }
}

fn invalid(syntax: &'static str, input: &ValueInput, reason: &'static str) -> Error {
    Error::InvalidValue {
        syntax,
        input: input.to_string().into(),
        reason,
    }
}

fn to_i64(syntax: &'static str, input: &ValueInput) -> Result<i64> {
    match input {
        ValueInput::Integer(n) => Ok(*n),
        ValueInput::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(syntax, input, "not an integer")),
        ValueInput::List(_) => Err(invalid(syntax, input, "expected a scalar")),
    }
}

fn to_i32(syntax: &'static str, input: &ValueInput) -> Result<i32> {
    i32::try_from(to_i64(syntax, input)?).map_err(|_| invalid(syntax, input, "out of range"))
}

fn to_u32(syntax: &'static str, input: &ValueInput) -> Result<u32> {
    u32::try_from(to_i64(syntax, input)?).map_err(|_| invalid(syntax, input, "out of range"))
}

/// Convert to an OCTET STRING. Lists are taken as raw octets.
pub fn convert_to_octet_string(input: impl Into<ValueInput>) -> Result<Value> {
    let input = input.into();
    let bytes = match &input {
        ValueInput::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
        ValueInput::Integer(n) => Bytes::from(n.to_string()),
        ValueInput::List(items) => items
            .iter()
            .map(|&b| u8::try_from(b).map_err(|_| invalid("OctetString", &input, "octet out of range")))
            .collect::<Result<Vec<u8>>>()?
            .into(),
    };
    Ok(Value::OctetString(bytes))
}

/// Convert to an INTEGER.
pub fn convert_to_integer(input: impl Into<ValueInput>) -> Result<Value> {
    Ok(Value::Integer(to_i32("Integer", &input.into())?))
}

/// Convert to an Integer32 (same wire type as INTEGER).
pub fn convert_to_integer32(input: impl Into<ValueInput>) -> Result<Value> {
    Ok(Value::Integer(to_i32("Integer32", &input.into())?))
}

pub fn convert_to_counter32(input: impl Into<ValueInput>) -> Result<Value> {
    Ok(Value::Counter32(to_u32("Counter32", &input.into())?))
}

pub fn convert_to_counter64(input: impl Into<ValueInput>) -> Result<Value> {
    let input = input.into();
    let n = match &input {
        // parsed separately so the full u64 range is reachable from text
        ValueInput::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid("Counter64", &input, "not a non-negative integer"))?,
        _ => u64::try_from(to_i64("Counter64", &input)?)
            .map_err(|_| invalid("Counter64", &input, "out of range"))?,
    };
    Ok(Value::Counter64(n))
}

pub fn convert_to_gauge32(input: impl Into<ValueInput>) -> Result<Value> {
    Ok(Value::Gauge32(to_u32("Gauge32", &input.into())?))
}

/// Convert to an Unsigned32 (same wire type as Gauge32).
pub fn convert_to_unsigned32(input: impl Into<ValueInput>) -> Result<Value> {
    Ok(Value::Gauge32(to_u32("Unsigned32", &input.into())?))
}

pub fn convert_to_timeticks(input: impl Into<ValueInput>) -> Result<Value> {
    Ok(Value::TimeTicks(to_u32("TimeTicks", &input.into())?))
}

/// Convert to an IpAddress from dotted IPv4 text or a list of four octets.
pub fn convert_to_ip_address(input: impl Into<ValueInput>) -> Result<Value> {
    let input = input.into();
    let octets = match &input {
        ValueInput::Text(text) => text
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| invalid("IpAddress", &input, "not a dotted IPv4 address"))?
            .octets(),
        ValueInput::List(items) => {
            let octets = items
                .iter()
                .map(|&b| u8::try_from(b).map_err(|_| invalid("IpAddress", &input, "octet out of range")))
                .collect::<Result<Vec<u8>>>()?;
            <[u8; 4]>::try_from(octets.as_slice())
                .map_err(|_| invalid("IpAddress", &input, "expected four octets"))?
        }
        ValueInput::Integer(_) => return Err(invalid("IpAddress", &input, "expected an address")),
    };
    Ok(Value::IpAddress(octets))
}

/// Convert using a MIB SYNTAX name such as `Counter32` or `DisplayString`.
///
/// Returns `None` for syntaxes without a dedicated converter.
pub fn convert_with_syntax(syntax: &str, input: ValueInput) -> Option<Result<Value>> {
    let converted = match syntax {
        "INTEGER" | "Integer" | "TruthValue" | "RowStatus" => convert_to_integer(input),
        "Integer32" => convert_to_integer32(input),
        "Counter32" | "Counter" => convert_to_counter32(input),
        "Counter64" => convert_to_counter64(input),
        "Gauge32" | "Gauge" => convert_to_gauge32(input),
        "Unsigned32" => convert_to_unsigned32(input),
        "TimeTicks" => convert_to_timeticks(input),
        "IpAddress" => convert_to_ip_address(input),
        "OCTET STRING" | "OctetString" | "DisplayString" | "SnmpAdminString" | "PhysAddress" => {
            convert_to_octet_string(input)
        }
        "OBJECT IDENTIFIER" | "ObjectIdentifier" | "AutonomousType" => convert_to_object_identifier(input),
        _ => return None,
    };
    Some(converted)
}

fn convert_to_object_identifier(input: ValueInput) -> Result<Value> {
    let ValueInput::Text(text) = &input else {
        return Err(invalid("ObjectIdentifier", &input, "expected dotted text"));
    };
    let arcs = text
        .trim()
        .trim_start_matches('.')
        .split('.')
        .map(str::parse::<u32>)
        .collect::<std::result::Result<Vec<u32>, _>>()
        .map_err(|_| invalid("ObjectIdentifier", &input, "not a numeric OID"))?;
    Ok(Value::ObjectIdentifier(Oid::from_slice(&arcs)))
}

/// Default conversion for untyped SET values with no MIB syntax.
pub(crate) fn convert_untyped(input: ValueInput) -> Result<Value> {
    match input {
        ValueInput::Integer(_) => convert_to_integer(input),
        _ => convert_to_octet_string(input),
    }
}

/// True when an OCTET STRING should be shown as text.
pub(crate) fn is_printable(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes).is_ok_and(|s| s.chars().all(|c| !c.is_control() || c.is_whitespace()))
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Render a value the way walk results and logs show it.
///
/// OIDs get a leading dot, printable octet strings are shown as text and
/// other octet strings as `0x`-prefixed hex.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        Value::OctetString(bytes) if is_printable(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::OctetString(bytes) | Value::Opaque(bytes) => hex(bytes),
        Value::Null => String::new(),
        Value::ObjectIdentifier(oid) => format_numeric_oid(oid),
        Value::IpAddress(octets) => Ipv4Addr::from(*octets).to_string(),
        Value::Counter32(n) | Value::Gauge32(n) | Value::TimeTicks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        Value::NoSuchObject => "noSuchObject".to_string(),
        Value::NoSuchInstance => "noSuchInstance".to_string(),
        Value::EndOfMibView => "endOfMibView".to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// Octet string contents as text, or `None` for any other type.
pub fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::OctetString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions() {
        assert_eq!(convert_to_integer("42").unwrap(), Value::Integer(42));
        assert_eq!(convert_to_integer(-7i64).unwrap(), Value::Integer(-7));
        assert_eq!(convert_to_integer32(" 5 ").unwrap(), Value::Integer(5));
        assert!(convert_to_integer("2147483648").is_err());
        assert!(convert_to_integer("abc").is_err());
    }

    #[test]
    fn test_unsigned_conversions() {
        assert_eq!(convert_to_counter32("10").unwrap(), Value::Counter32(10));
        assert_eq!(convert_to_gauge32(200u32).unwrap(), Value::Gauge32(200));
        assert_eq!(convert_to_unsigned32("7").unwrap(), Value::Gauge32(7));
        assert_eq!(convert_to_timeticks("100").unwrap(), Value::TimeTicks(100));
        assert!(convert_to_counter32("-1").is_err());
        assert!(convert_to_gauge32("4294967296").is_err());
    }

    #[test]
    fn test_counter64_full_range() {
        assert_eq!(
            convert_to_counter64("18446744073709551615").unwrap(),
            Value::Counter64(u64::MAX)
        );
        assert_eq!(convert_to_counter64(3i64).unwrap(), Value::Counter64(3));
        assert!(convert_to_counter64(-3i64).is_err());
    }

    #[test]
    fn test_octet_string() {
        assert_eq!(
            convert_to_octet_string("abc").unwrap(),
            Value::OctetString(Bytes::from_static(b"abc"))
        );
        assert_eq!(
            convert_to_octet_string(vec![0i64, 255]).unwrap(),
            Value::OctetString(Bytes::from_static(&[0, 255]))
        );
        assert!(convert_to_octet_string(vec![256i64]).is_err());
    }

    #[test]
    fn test_ip_address() {
        assert_eq!(
            convert_to_ip_address("172.16.0.1").unwrap(),
            Value::IpAddress([172, 16, 0, 1])
        );
        assert_eq!(
            convert_to_ip_address(vec![172i64, 16, 0, 1]).unwrap(),
            Value::IpAddress([172, 16, 0, 1])
        );
        assert!(convert_to_ip_address(vec![1i64, 2, 3]).is_err());
        assert!(convert_to_ip_address("300.1.1.1").is_err());
        assert!(convert_to_ip_address(5i64).is_err());
    }

    #[test]
    fn test_convert_with_syntax() {
        assert_eq!(
            convert_with_syntax("Counter32", "9".into()).unwrap().unwrap(),
            Value::Counter32(9)
        );
        assert_eq!(
            convert_with_syntax("DisplayString", "x".into()).unwrap().unwrap(),
            Value::OctetString(Bytes::from_static(b"x"))
        );
        assert_eq!(
            convert_with_syntax("OBJECT IDENTIFIER", ".1.3.6".into()).unwrap().unwrap(),
            Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6]))
        );
        assert!(convert_with_syntax("SEQUENCE", "x".into()).is_none());
    }

    #[test]
    fn test_convert_untyped() {
        assert_eq!(convert_untyped(3i64.into()).unwrap(), Value::Integer(3));
        assert_eq!(
            convert_untyped("3".into()).unwrap(),
            Value::OctetString(Bytes::from_static(b"3"))
        );
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::Integer(-1)), "-1");
        assert_eq!(render_value(&Value::OctetString(Bytes::from_static(b"Linux"))), "Linux");
        assert_eq!(
            render_value(&Value::OctetString(Bytes::from_static(&[0x00, 0x1b, 0xff]))),
            "0x001bff"
        );
        assert_eq!(
            render_value(&Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1]))),
            ".1.3.6.1"
        );
        assert_eq!(render_value(&Value::IpAddress([10, 0, 0, 1])), "10.0.0.1");
        assert_eq!(render_value(&Value::NoSuchInstance), "noSuchInstance");
    }

    #[test]
    fn test_display_string() {
        assert_eq!(
            display_string(&Value::OctetString(Bytes::from_static(b"up"))),
            Some("up".to_string())
        );
        assert_eq!(display_string(&Value::Integer(1)), None);
    }
}
