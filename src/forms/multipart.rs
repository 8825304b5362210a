//! Multipart bodies posted by the form screens.

use std::collections::BTreeMap;

use actix_multipart::Multipart;
use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::web;
use futures::TryStreamExt;

use crate::domain::types::UploadFile;
use crate::forms::FormError;

/// Largest file accepted through the resource form.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Resource create/update form. Field names are only known from the
/// descriptor, so the body is read field by field.
#[derive(Debug, Default)]
pub struct SaveResourceForm {
    /// Present when editing an existing record.
    pub id: Option<String>,
    /// List page to return to after saving.
    pub page: Option<usize>,
    pub values: BTreeMap<String, String>,
    /// Files picked in the form, keyed by the field they belong to.
    pub files: Vec<(String, UploadFile)>,
}

impl SaveResourceForm {
    pub async fn from_multipart(mut payload: Multipart) -> Result<Self, FormError> {
        let mut form = SaveResourceForm::default();

        while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(malformed)? {
                if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                    return Err(FormError::Malformed(format!("{name} is larger than 10MB")));
                }
                bytes.extend_from_slice(&chunk);
            }

            match file_name {
                // An untouched file input still posts an empty part.
                Some(file_name) => {
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.files.push((
                            name,
                            UploadFile {
                                file_name,
                                content_type,
                                bytes,
                            },
                        ));
                    }
                }
                None => {
                    let text = String::from_utf8(bytes)
                        .map_err(|_| FormError::Malformed(format!("{name} is not UTF-8")))?;
                    form.set_text(name, text);
                }
            }
        }

        Ok(form)
    }

    fn set_text(&mut self, name: String, text: String) {
        match name.as_str() {
            "id" => self.id = Some(text).filter(|id| !id.trim().is_empty()),
            "page" => self.page = text.trim().parse().ok(),
            _ => {
                // Multi-selects post one part per selected option.
                self.values
                    .entry(name)
                    .and_modify(|existing| {
                        existing.push(',');
                        existing.push_str(&text);
                    })
                    .or_insert(text);
            }
        }
    }
}

fn malformed(err: impl std::fmt::Display) -> FormError {
    FormError::Malformed(err.to_string())
}

#[derive(MultipartForm)]
/// Spreadsheet of questions to append to a mock test.
pub struct UploadQuestionsForm {
    #[multipart(limit = "10MB")]
    pub question_file: TempFile,
}

impl UploadQuestionsForm {
    /// Reads the spooled file on the blocking pool.
    pub async fn into_upload(self) -> Result<UploadFile, FormError> {
        let file = self.question_file;
        let file_name = file
            .file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| FormError::MissingField("question_file".to_string()))?;
        let spooled = file.file;
        let bytes = web::block(move || std::fs::read(spooled.path()))
            .await
            .map_err(malformed)?
            .map_err(malformed)?;

        Ok(UploadFile {
            file_name,
            content_type: file.content_type.map(|mime| mime.to_string()),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_parts_are_joined_for_multi_selects() {
        let mut form = SaveResourceForm::default();
        form.set_text("role_ids".into(), "1".into());
        form.set_text("role_ids".into(), "4".into());
        form.set_text("id".into(), " ".into());
        form.set_text("page".into(), "3".into());

        assert_eq!(form.values.get("role_ids").map(String::as_str), Some("1,4"));
        assert_eq!(form.id, None);
        assert_eq!(form.page, Some(3));
    }

    fn question_form(file_name: Option<&str>, body: &[u8]) -> UploadQuestionsForm {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, body).unwrap();
        UploadQuestionsForm {
            question_file: TempFile {
                file,
                content_type: None,
                file_name: file_name.map(str::to_string),
                size: body.len(),
            },
        }
    }

    #[actix_web::test]
    async fn question_file_is_read_from_the_spooled_copy() {
        let upload = question_form(Some("questions.xlsx"), b"sheet bytes")
            .into_upload()
            .await
            .unwrap();

        assert_eq!(upload.file_name, "questions.xlsx");
        assert_eq!(upload.bytes, b"sheet bytes".to_vec());
        assert_eq!(upload.content_type, None);
    }

    #[actix_web::test]
    async fn question_file_without_name_is_missing() {
        let result = question_form(Some("  "), b"x").into_upload().await;

        assert!(matches!(
            result,
            Err(FormError::MissingField(field)) if field == "question_file"
        ));
    }
}
