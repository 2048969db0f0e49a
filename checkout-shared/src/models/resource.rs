use serde::{Deserialize, Serialize};

/// A hypermedia (HAL) representation: the entity's own fields plus `_links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalResource<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl<T> HalResource<T> {
    pub fn new(content: T, self_href: &str) -> Self {
        Self {
            content,
            links: Links {
                self_link: Some(Link {
                    href: self_href.to_string(),
                }),
            },
        }
    }

    /// The resource's self-reference, which encodes its identity.
    pub fn self_href(&self) -> Option<&str> {
        self.links.self_link.as_ref().map(|link| link.href.as_str())
    }

    pub fn into_content(self) -> T {
        self.content
    }
}
