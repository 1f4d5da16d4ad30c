use uuid::Uuid;

use crate::state::{SignedPart, StagedMultipart};

const PART_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A rendered `multipart/mixed` body and its boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub boundary: String,
    pub body: Vec<u8>,
}

impl MultipartBody {
    pub fn content_type(&self) -> String {
        format!("multipart/mixed; boundary={}", self.boundary)
    }
}

/// Render the staged parts, manifest first. `None` when nothing is staged.
pub fn render(staged: &StagedMultipart) -> Option<MultipartBody> {
    if staged.is_empty() {
        return None;
    }

    let boundary = format!("----FixtureServerBoundary{}", Uuid::new_v4().simple());
    let mut body = String::new();
    let parts = [("manifest", &staged.manifest), ("directive", &staged.directive)];
    for (name, part) in parts {
        if let Some(part) = part {
            push_part(&mut body, &boundary, name, part);
        }
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Some(MultipartBody {
        boundary,
        body: body.into_bytes(),
    })
}

fn push_part(body: &mut String, boundary: &str, name: &str, part: &SignedPart) {
    body.push_str(&format!("--{boundary}\r\n"));
    body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n"));
    body.push_str(&format!("content-type: {PART_CONTENT_TYPE}\r\n"));
    body.push_str(&format!("expo-signature: {}\r\n", part.signature));
    body.push_str("\r\n");
    body.push_str(&part.body);
    body.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(body: &str, sig: &str) -> SignedPart {
        SignedPart {
            body: body.to_string(),
            signature: format!("sig=\"{sig}\", keyid=\"main\""),
        }
    }

    #[test]
    fn nothing_staged_renders_nothing() {
        assert!(render(&StagedMultipart::default()).is_none());
    }

    #[test]
    fn renders_manifest_before_directive() {
        let staged = StagedMultipart {
            manifest: Some(part(r#"{"id":"m"}"#, "bWFuaWZlc3Q=")),
            directive: Some(part(r#"{"type":"rollBackToEmbedded"}"#, "ZGlyZWN0aXZl")),
        };
        let rendered = render(&staged).unwrap();
        let text = String::from_utf8(rendered.body.clone()).unwrap();

        assert_eq!(
            rendered.content_type(),
            format!("multipart/mixed; boundary={}", rendered.boundary)
        );
        let manifest_at = text.find("name=\"manifest\"").unwrap();
        let directive_at = text.find("name=\"directive\"").unwrap();
        assert!(manifest_at < directive_at);
        assert!(text.contains("expo-signature: sig=\"bWFuaWZlc3Q=\", keyid=\"main\"\r\n"));
        assert!(text.contains("\r\n\r\n{\"type\":\"rollBackToEmbedded\"}\r\n"));
        assert!(text.ends_with(&format!("--{}--\r\n", rendered.boundary)));
        assert_eq!(text.matches(&format!("--{}\r\n", rendered.boundary)).count(), 2);
    }

    #[test]
    fn directive_alone_is_a_single_part() {
        let staged = StagedMultipart {
            manifest: None,
            directive: Some(part("{}", "c2ln")),
        };
        let text = String::from_utf8(render(&staged).unwrap().body).unwrap();
        assert!(!text.contains("name=\"manifest\""));
        assert!(text.contains("name=\"directive\""));
    }
}
