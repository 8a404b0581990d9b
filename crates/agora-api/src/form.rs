use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::ApiError;

pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A fully buffered multipart form: text fields in arrival order (names may
/// repeat) and non-empty file parts.
#[derive(Default)]
pub struct FormData {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, UploadedFile)>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            let file_name = field.file_name().map(str::to_string);
            match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    // browsers send an empty part when no file was picked
                    if !bytes.is_empty() {
                        form.files.push((name, UploadedFile { file_name, bytes }));
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.fields.push((name, text));
                }
            }
        }

        Ok(form)
    }

    /// First value of a text field.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values(name).next()
    }

    pub fn values<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> + use<'a, 'b> {
        self.fields
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Parse a required integer field.
    pub fn required_i64(&self, name: &str) -> Result<i64, ApiError> {
        self.value(name)
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> FormData {
        FormData {
            fields: fields
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    #[test]
    fn repeated_fields_keep_order() {
        let form = form(&[("tags", "rust"), ("title", "t"), ("tags", "sqlite")]);
        assert_eq!(form.values("tags").collect::<Vec<_>>(), vec!["rust", "sqlite"]);
        assert_eq!(form.value("title"), Some("t"));
        assert!(form.value("missing").is_none());
    }

    #[test]
    fn required_i64_rejects_garbage() {
        let form = form(&[("userId", " 12 "), ("bad", "twelve")]);
        assert_eq!(form.required_i64("userId").unwrap(), 12);
        assert!(form.required_i64("bad").is_err());
        assert!(form.required_i64("absent").is_err());
    }
}
