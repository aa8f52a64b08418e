use crate::CodecError;

/// Growable JSON sink.
#[derive(Debug, Default, Clone)]
pub struct JsonWriter {
    buf: Vec<u8>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_null(&mut self) {
        self.buf.extend_from_slice(b"null");
    }

    pub fn write_bool(&mut self, value: bool) {
        let text: &[u8] = if value { b"true" } else { b"false" };
        self.buf.extend_from_slice(text);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(value.to_string().as_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(value.to_string().as_bytes());
    }

    /// Writes the shortest representation that reads back to the same value.
    pub fn write_f64(&mut self, value: f64) -> Result<(), CodecError> {
        if !value.is_finite() {
            return Err(CodecError::NonFinite(value));
        }
        self.buf.extend_from_slice(value.to_string().as_bytes());
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), CodecError> {
        if !value.is_finite() {
            return Err(CodecError::NonFinite(f64::from(value)));
        }
        self.buf.extend_from_slice(value.to_string().as_bytes());
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) {
        self.buf.push(b'"');
        let bytes = value.as_bytes();
        let mut start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            let escape: &[u8] = match byte {
                b'"' => b"\\\"",
                b'\\' => b"\\\\",
                b'\n' => b"\\n",
                b'\r' => b"\\r",
                b'\t' => b"\\t",
                0x08 => b"\\b",
                0x0C => b"\\f",
                0x00..=0x1F => {
                    self.buf.extend_from_slice(&bytes[start..i]);
                    self.buf
                        .extend_from_slice(format!("\\u{:04x}", byte).as_bytes());
                    start = i + 1;
                    continue;
                }
                _ => continue,
            };
            self.buf.extend_from_slice(&bytes[start..i]);
            self.buf.extend_from_slice(escape);
            start = i + 1;
        }
        self.buf.extend_from_slice(&bytes[start..]);
        self.buf.push(b'"');
    }

    pub fn write_begin_object(&mut self) {
        self.buf.push(b'{');
    }

    pub fn write_end_object(&mut self) {
        self.buf.push(b'}');
    }

    pub fn write_begin_array(&mut self) {
        self.buf.push(b'[');
    }

    pub fn write_end_array(&mut self) {
        self.buf.push(b']');
    }

    pub fn write_value_separator(&mut self) {
        self.buf.push(b',');
    }

    pub fn write_name_separator(&mut self) {
        self.buf.push(b':');
    }

    /// Writes `"name":`.
    pub fn write_property_name(&mut self, name: &str) {
        self.write_string(name);
        self.write_name_separator();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_and_quote_characters() {
        let mut writer = JsonWriter::new();
        writer.write_string("a\"b\\c\n\u{1}");
        assert_eq!(writer.as_bytes(), br#""a\"b\\c\n\u0001""#);
    }

    #[test]
    fn rejects_non_finite_floats() {
        let mut writer = JsonWriter::new();
        assert!(matches!(
            writer.write_f64(f64::NAN),
            Err(CodecError::NonFinite(_))
        ));
        assert!(writer.is_empty());
    }

    #[test]
    fn property_names_carry_the_separator() {
        let mut writer = JsonWriter::new();
        writer.write_begin_object();
        writer.write_property_name("Id");
        writer.write_i64(42);
        writer.write_end_object();
        assert_eq!(writer.as_bytes(), br#"{"Id":42}"#);
    }
}
