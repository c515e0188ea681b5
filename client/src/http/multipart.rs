//! In-memory `multipart/form-data` encoding
//!
//! The body is buffered rather than streamed so that it can be hashed when
//! the request is signed.

/// Builder for a multipart body
#[derive(Debug)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    /// Create a body with a random boundary
    pub fn new() -> Self {
        Self::with_boundary(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// Value for the `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a plain form field
    pub fn add_field(&mut self, name: &str, value: &[u8]) -> &mut Self {
        let headers = format!("Content-Disposition: form-data; name=\"{}\"\r\n", escape_quotes(name));
        self.add_part(&headers, value)
    }

    /// Append a file part
    pub fn add_file(&mut self, name: &str, filename: &str, contents: &[u8]) -> &mut Self {
        let headers = format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n",
            escape_quotes(name),
            escape_quotes(filename)
        );
        self.add_part(&headers, contents)
    }

    fn add_part(&mut self, headers: &str, contents: &[u8]) -> &mut Self {
        if !self.body.is_empty() {
            self.body.extend_from_slice(b"\r\n");
        }
        self.body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(headers.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(contents);
        self
    }

    /// Write the closing delimiter and return the encoded body
    pub fn finish(mut self) -> Vec<u8> {
        if !self.body.is_empty() {
            self.body.extend_from_slice(b"\r\n");
        }
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
