//! Response schemas and their XML decoders.
//!
//! Each decoder reads the children of the document's root element; an
//! expected element that is absent is a `MissingElement` error. Element text
//! is returned verbatim (an empty element decodes to an empty string).

use crate::error::{Error, Result};
use roxmltree::{Document, Node};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub expiration_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageInfo {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorRegions {
    pub number: String,
    pub regions: Vec<String>,
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(name))
}

fn text_of(node: Node<'_, '_>) -> String {
    node.text().unwrap_or_default().to_string()
}

/// Text of the element at a `/`-separated path below `node`.
fn path_text(node: Node<'_, '_>, path: &str) -> Result<String> {
    let mut current = node;
    for part in path.split('/') {
        current = child(current, part).ok_or_else(|| Error::missing_element(path))?;
    }
    Ok(text_of(current))
}

fn parse(body: &str) -> Result<Document<'_>> {
    Ok(Document::parse(body)?)
}

/// Turn a non-200 error document into `Error::Api`.
///
/// Returns the parse or lookup failure instead when the body is not a
/// usable error document.
pub fn api_error(body: &str) -> Error {
    match status(body) {
        Ok(StatusInfo { code, message }) => Error::Api { code, message },
        Err(err) => err,
    }
}

pub fn status(body: &str) -> Result<StatusInfo> {
    let doc = parse(body)?;
    let root = doc.root_element();
    Ok(StatusInfo {
        code: path_text(root, "Code")?,
        message: path_text(root, "Message")?,
    })
}

pub fn message(body: &str) -> Result<MessageInfo> {
    let doc = parse(body)?;
    Ok(MessageInfo {
        message: path_text(doc.root_element(), "Message")?,
    })
}

pub fn token(body: &str) -> Result<TokenInfo> {
    let doc = parse(body)?;
    let root = doc.root_element();
    Ok(TokenInfo {
        access_token: path_text(root, "AccessToken")?,
        expiration_date: path_text(root, "ExpirationDate")?,
    })
}

/// Repeated `Account` elements, in document order.
pub fn accounts(body: &str) -> Result<Vec<Account>> {
    let doc = parse(body)?;
    children(doc.root_element(), "Account")
        .map(|account| {
            Ok(Account {
                name: path_text(account, "Name")?,
                number: path_text(account, "Number")?,
            })
        })
        .collect()
}

pub fn vendors(body: &str) -> Result<Vec<String>> {
    let doc = parse(body)?;
    Ok(children(doc.root_element(), "Vendor").map(text_of).collect())
}

/// First `Vendor/Number` and the region codes of every `Vendor`, in
/// document order.
pub fn vendor_regions(body: &str) -> Result<VendorRegions> {
    let doc = parse(body)?;
    let root = doc.root_element();
    let number = children(root, "Vendor")
        .find_map(|vendor| child(vendor, "Number"))
        .map(text_of)
        .ok_or_else(|| Error::missing_element("Vendor/Number"))?;
    let regions = children(root, "Vendor")
        .flat_map(|vendor| children(vendor, "Region"))
        .map(|region| path_text(region, "Code"))
        .collect::<Result<Vec<_>>>()?;
    Ok(VendorRegions { number, regions })
}
