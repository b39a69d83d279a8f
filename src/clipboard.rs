use crate::error::ClipboardError;

/// Plain-text clipboard sink.
pub trait ClipboardPort {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard through arboard. A fresh handle is opened per write so a
/// clipboard that was unavailable at launch can recover later.
#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl ClipboardPort for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
    }
}
