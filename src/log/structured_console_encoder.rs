use log::{
    Record,
    kv::{Error, Key, Value, VisitSource},
};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::{Color, Encode, Style, Write};
use serde::Deserialize;
use std::io;

/// Key-value fields whose values never reach the log output.
const SENSITIVE_KEYS: &[&str] = &["token", "password", "authorization", "seedphrase"];

#[derive(Debug, Deserialize)]
pub struct StructuredConsoleEncoderConfig {
    pub pattern: Option<String>,
    /// Extra keys to redact on top of the built-in list.
    #[serde(default)]
    pub redact: Vec<String>,
}

/// Pattern encoder that appends the record's key-values as ` key=value`,
/// redacting credentials.
#[derive(Debug)]
pub struct StructuredConsoleEncoder {
    delegate: PatternEncoder,
    redact: Vec<String>,
}

impl StructuredConsoleEncoder {
    pub fn new(pattern: &str) -> Self {
        Self::with_redactions(pattern, Vec::new())
    }

    pub fn with_redactions(pattern: &str, extra: Vec<String>) -> Self {
        let mut redact: Vec<String> = SENSITIVE_KEYS.iter().map(|k| k.to_string()).collect();
        redact.extend(extra.into_iter().map(|k| k.to_ascii_lowercase()));
        Self {
            delegate: PatternEncoder::new(pattern),
            redact,
        }
    }

    fn is_redacted(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.redact.iter().any(|k| *k == key)
    }
}

impl Encode for StructuredConsoleEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        self.delegate.encode(w, record)?;

        let mut visitor = TextVisitor {
            encoder: self,
            writer: w,
            io_err: None,
        };

        if let Err(kv_err) = record.key_values().visit(&mut visitor) {
            if let Some(io_err) = visitor.io_err {
                return Err(io_err.into());
            }
            write!(w, " [KV Error: {}]", kv_err)?;
        }

        w.write_all(b"\n")?;
        Ok(())
    }
}

struct TextVisitor<'a> {
    encoder: &'a StructuredConsoleEncoder,
    writer: &'a mut dyn Write,
    io_err: Option<io::Error>,
}

impl<'a, 'kvs> VisitSource<'kvs> for TextVisitor<'a> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), Error> {
        let redacted = self.encoder.is_redacted(key.as_str());
        let result = (|| {
            self.writer.set_style(Style::new().text(Color::Cyan))?;
            write!(self.writer, " {}=", key)?;

            self.writer.set_style(&Style::default())?;
            if redacted {
                write!(self.writer, "<REDACTED>")?;
            } else {
                write!(self.writer, "{}", value)?;
            }
            Ok::<(), io::Error>(())
        })();

        if let Err(e) = result {
            self.io_err = Some(e);
            return Err(Error::msg("io error during visit"));
        }

        Ok(())
    }
}

pub struct StructuredConsoleEncoderDeserializer;

impl log4rs::config::Deserialize for StructuredConsoleEncoderDeserializer {
    type Trait = dyn Encode;
    type Config = StructuredConsoleEncoderConfig;

    fn deserialize(
        &self,
        config: StructuredConsoleEncoderConfig,
        _: &log4rs::config::Deserializers,
    ) -> anyhow::Result<Box<dyn Encode>> {
        let pattern = config.pattern.as_deref().unwrap_or("{d} {l} {t} {m}");
        Ok(Box::new(StructuredConsoleEncoder::with_redactions(pattern, config.redact)))
    }
}
