use super::{FlatRow, SedaMetadata};
use crate::error::SedaResult;
use crate::xml::{SedaXmlReader, SedaXmlWriter};
use std::io::{BufRead, Write};

/// Unmodeled element kept as its serialized form and written back as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyXmlType {
    pub name: String,
    pub raw: String,
}

impl AnyXmlType {
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
        }
    }
}

impl SedaMetadata for AnyXmlType {
    type ReadContext = ();

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, _: Self::ReadContext) -> SedaResult<Self> {
        let (name, raw) = reader.read_raw()?;
        Ok(Self { name, raw })
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        writer.raw_block(&self.raw)
    }

    fn to_flat_row(&self) -> FlatRow {
        vec![(self.name.clone(), self.raw.clone())]
    }
}
