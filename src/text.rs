use log::warn;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Meta event text. No encoding is mandated for it, so UTF-8 is attempted and the raw bytes are
/// kept when that fails.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Text {
    Utf8(String),
    Other(Vec<u8>),
}

impl Default for Text {
    fn default() -> Self {
        Text::Utf8(String::new())
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl From<Vec<u8>> for Text {
    fn from(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => Text::Utf8(s),
            Err(e) => {
                warn!("text is not UTF-8: {}", e);
                Text::Other(e.into_bytes())
            }
        }
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::Utf8(s.into())
    }
}

impl From<Text> for String {
    /// Lossy when the text is not UTF-8.
    fn from(text: Text) -> String {
        match text {
            Text::Utf8(s) => s,
            Text::Other(b) => String::from_utf8_lossy(&b).into_owned(),
        }
    }
}

impl Text {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Text::Utf8(s) => s.as_bytes(),
            Text::Other(b) => b.as_slice(),
        }
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Text::Utf8(s) => Cow::Borrowed(s.as_str()),
            Text::Other(b) => String::from_utf8_lossy(b),
        }
    }

    /// The number of bytes the text occupies in a file.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[test]
fn text_keeps_invalid_bytes() {
    let text = Text::from(vec![b'a', 0xFF]);
    assert_eq!(Text::Other(vec![b'a', 0xFF]), text);
    assert_eq!(2, text.len());
    assert_eq!("a\u{FFFD}", text.to_string());
    let text = Text::from(b"Piano".to_vec());
    assert_eq!(Text::from("Piano"), text);
    assert_eq!(String::from("Piano"), String::from(text));
}
