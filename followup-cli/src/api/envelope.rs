//! SOAP 1.1 envelopes for the Sponte `WSAPIEdu` service
//!
//! Requests are small enough to template by hand. Responses are converted to an
//! untyped [`serde_json::Value`] tree because their shape varies by deployment.

use anyhow::{Context, Result, bail};
use quick_xml::escape::escape;
use serde_json::{Map, Value};

pub const SERVICE_NAMESPACE: &str = "http://api.sponteeducacional.net.br/";

/// `SOAPAction` header value for an operation
pub fn soap_action(operation: &str) -> String {
    format!("\"{}{}\"", SERVICE_NAMESPACE, operation)
}

/// Build a request envelope for `operation` with `(name, value)` parameters
pub fn build_request(operation: &str, params: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in params {
        body.push_str(&format!("      <{name}>{}</{name}>\n", escape(*value)));
    }

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<soap:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ",
            "xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" ",
            "xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\n",
            "  <soap:Body>\n",
            "    <{op} xmlns=\"{ns}\">\n",
            "{body}",
            "    </{op}>\n",
            "  </soap:Body>\n",
            "</soap:Envelope>\n"
        ),
        op = operation,
        ns = SERVICE_NAMESPACE,
        body = body,
    )
}

/// Parse a response envelope into the value of the operation's response element.
///
/// `<GetAlunosResponse><GetAlunosResult>..</GetAlunosResult></GetAlunosResponse>`
/// becomes `{"GetAlunosResult": ..}`. SOAP faults are returned as errors.
pub fn parse_response(xml: &str) -> Result<Value> {
    let doc = roxmltree::Document::parse(xml).context("Response is not valid XML")?;

    let body = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "Body")
        .context("Response has no SOAP Body")?;

    let Some(payload) = body.children().find(|n| n.is_element()) else {
        return Ok(Value::Null);
    };

    if payload.tag_name().name() == "Fault" {
        let reason = payload
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "faultstring")
            .and_then(|n| n.text())
            .unwrap_or("unknown fault");
        bail!("SOAP fault: {}", reason.trim());
    }

    Ok(element_to_value(payload))
}

/// Convert an element to a value: children become object keys (namespace
/// prefixes dropped), repeated children become arrays, text-only elements
/// become strings and empty ones null. Attributes are ignored.
pub fn element_to_value(node: roxmltree::Node<'_, '_>) -> Value {
    let children: Vec<_> = node.children().filter(|c| c.is_element()).collect();

    if children.is_empty() {
        return node
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Value::String(t.to_string()))
            .unwrap_or(Value::Null);
    }

    let mut map = Map::new();
    for child in children {
        let key = child.tag_name().name().to_string();
        let value = element_to_value(child);

        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }

    Value::Object(map)
}
