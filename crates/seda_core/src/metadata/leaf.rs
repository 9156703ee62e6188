//! Scalar element types.

use super::{FlatRow, SedaMetadata};
use crate::error::{SedaError, SedaResult};
use crate::xml::{SedaXmlReader, SedaXmlWriter};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone};
use std::io::{BufRead, Write};

/// Plain string code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringType {
    pub name: String,
    pub value: String,
}

impl StringType {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl SedaMetadata for StringType {
    type ReadContext = ();

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, _: Self::ReadContext) -> SedaResult<Self> {
        let start = reader.expect_start(None)?;
        let value = reader.read_text(&start.name)?;
        Ok(Self::new(start.name, value))
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        writer.text_element(&self.name, &[], &self.value)
    }

    fn to_flat_row(&self) -> FlatRow {
        vec![(self.name.clone(), self.value.clone())]
    }
}

/// Free text with optional `xml:lang`. The only truncatable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextType {
    pub name: String,
    pub value: String,
    pub lang: Option<String>,
}

impl TextType {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            lang: None,
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Keeps the first `limit` characters. Returns `None` when the value is
    /// already short enough.
    pub fn truncated(&self, limit: usize) -> Option<Self> {
        if self.value.chars().count() <= limit {
            return None;
        }
        Some(Self {
            name: self.name.clone(),
            value: self.value.chars().take(limit).collect(),
            lang: self.lang.clone(),
        })
    }
}

impl SedaMetadata for TextType {
    type ReadContext = ();

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, _: Self::ReadContext) -> SedaResult<Self> {
        let start = reader.expect_start(None)?;
        let lang = start.attribute("xml:lang").map(str::to_string);
        let value = reader.read_text(&start.name)?;
        Ok(Self {
            name: start.name,
            value,
            lang,
        })
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        match &self.lang {
            Some(lang) => writer.text_element(&self.name, &[("xml:lang", lang)], &self.value),
            None => writer.text_element(&self.name, &[], &self.value),
        }
    }

    fn to_flat_row(&self) -> FlatRow {
        let mut row = vec![(self.name.clone(), self.value.clone())];
        if let Some(lang) = &self.lang {
            row.push((format!("{}.attr(xml:lang)", self.name), lang.clone()));
        }
        row
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerType {
    pub name: String,
    pub value: i64,
}

impl IntegerType {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn parse(name: &str, raw: &str) -> SedaResult<Self> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| SedaError::scalar(name, raw, "an integer"))?;
        Ok(Self::new(name, value))
    }
}

impl SedaMetadata for IntegerType {
    type ReadContext = ();

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, _: Self::ReadContext) -> SedaResult<Self> {
        let start = reader.expect_start(None)?;
        let raw = reader.read_text(&start.name)?;
        Self::parse(&start.name, &raw)
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        writer.text_element(&self.name, &[], &self.value.to_string())
    }

    fn to_flat_row(&self) -> FlatRow {
        vec![(self.name.clone(), self.value.to_string())]
    }
}

/// Date-time with its original offset, or a plain calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl DateValue {
    /// Accepts RFC 3339, offset-less date-times (taken as UTC) and plain
    /// `YYYY-MM-DD` dates.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self::DateTime(value));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            let utc = FixedOffset::east_opt(0)?;
            return Some(Self::DateTime(utc.from_utc_datetime(&naive)));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(Self::Date)
    }

    /// ISO-8601 with an explicit `+HH:MM` offset for date-times.
    pub fn format(&self) -> String {
        match self {
            Self::DateTime(value) => value.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            Self::Date(value) => value.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeType {
    pub name: String,
    pub value: DateValue,
}

impl DateTimeType {
    pub fn new(name: impl Into<String>, value: DateValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn parse(name: &str, raw: &str) -> SedaResult<Self> {
        let value = DateValue::parse(raw).ok_or_else(|| SedaError::scalar(name, raw, "a date"))?;
        Ok(Self::new(name, value))
    }
}

impl SedaMetadata for DateTimeType {
    type ReadContext = ();

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, _: Self::ReadContext) -> SedaResult<Self> {
        let start = reader.expect_start(None)?;
        let raw = reader.read_text(&start.name)?;
        Self::parse(&start.name, &raw)
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        writer.text_element(&self.name, &[], &self.value.format())
    }

    fn to_flat_row(&self) -> FlatRow {
        vec![(self.name.clone(), self.value.format())]
    }
}

/// Message digest: algorithm attribute plus hex value, never verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestType {
    pub name: String,
    pub algorithm: String,
    pub value: String,
}

impl DigestType {
    pub fn new(
        name: impl Into<String>,
        algorithm: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            algorithm: algorithm.into(),
            value: value.into(),
        }
    }
}

impl SedaMetadata for DigestType {
    type ReadContext = ();

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, _: Self::ReadContext) -> SedaResult<Self> {
        let start = reader.expect_start(None)?;
        let algorithm = start
            .attribute("algorithm")
            .map(str::to_string)
            .ok_or_else(|| SedaError::missing("algorithm", start.name.clone()))?;
        let value = reader.read_text(&start.name)?;
        Ok(Self::new(start.name, algorithm, value))
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        writer.text_element(&self.name, &[("algorithm", &self.algorithm)], &self.value)
    }

    fn to_flat_row(&self) -> FlatRow {
        vec![
            (self.name.clone(), self.value.clone()),
            (format!("{}.attr(algorithm)", self.name), self.algorithm.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{DateValue, IntegerType, TextType};
    use crate::error::SedaError;

    #[test]
    fn date_times_keep_their_offset() {
        let value = DateValue::parse("2023-05-01T10:20:30+02:00").unwrap();
        assert_eq!(value.format(), "2023-05-01T10:20:30+02:00");
    }

    #[test]
    fn utc_is_written_as_numeric_offset() {
        let value = DateValue::parse("2023-05-01T10:20:30Z").unwrap();
        assert_eq!(value.format(), "2023-05-01T10:20:30+00:00");
        let naive = DateValue::parse("2023-05-01T10:20:30").unwrap();
        assert_eq!(naive, value);
    }

    #[test]
    fn plain_dates_stay_dates() {
        let value = DateValue::parse("1914-08-03").unwrap();
        assert!(matches!(value, DateValue::Date(_)));
        assert_eq!(value.format(), "1914-08-03");
        assert!(DateValue::parse("03/08/1914").is_none());
    }

    #[test]
    fn integer_parse_failure_is_a_scalar_error() {
        let err = IntegerType::parse("Size", "12kb").unwrap_err();
        assert!(matches!(err, SedaError::ScalarType { .. }));
    }

    #[test]
    fn truncation_counts_characters() {
        let text = TextType::new("Description", "Été à Paris").with_lang("fr");
        let short = text.truncated(3).unwrap();
        assert_eq!(short.value, "Été");
        assert_eq!(short.lang.as_deref(), Some("fr"));
        assert!(text.truncated(50).is_none());
    }
}
