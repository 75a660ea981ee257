//! Request options and response helpers for the publishing API.
//!
//! Response payloads are returned as `serde_json::Value`; the vendor's
//! schema is large and loosely documented, so only the dashboard hierarchy
//! is interpreted here.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Photo categories understood by the `type` filter of the photos endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Interior,
    Exterior,
    Item,
    Logo,
    Uncategorized,
}

impl ImageType {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Interior => "interior",
            ImageType::Exterior => "exterior",
            ImageType::Item => "item",
            ImageType::Logo => "logo",
            ImageType::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional filters for photo metadata. All `None` returns every image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<ImageType>,
}

impl PhotoFilter {
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = Some(image_type);
        self
    }

    /// Query parameters in wire order. Zero dimensions mean "no limit".
    pub(crate) fn to_params(self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(height) = self.max_height.filter(|h| *h > 0) {
            params.push(("height", height.to_string()));
        }
        if let Some(width) = self.max_width.filter(|w| *w > 0) {
            params.push(("width", width.to_string()));
        }
        if let Some(image_type) = self.image_type {
            params.push(("type", image_type.as_str().to_string()));
        }
        params
    }
}

/// Collect every `node_type == "location"` node below `parent`.
///
/// A location node is returned whole and not descended into; any other node
/// contributes the locations found under its `nodes` array.
pub fn collect_locations(parent: &Value) -> Vec<Value> {
    let mut locations = Vec::new();
    walk(parent, &mut locations);
    locations
}

fn walk(node: &Value, out: &mut Vec<Value>) {
    if node.get("node_type").and_then(Value::as_str) == Some("location") {
        out.push(node.clone());
        return;
    }
    if let Some(children) = node.get("nodes").and_then(Value::as_array) {
        for child in children {
            walk(child, out);
        }
    }
}
