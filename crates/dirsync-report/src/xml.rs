//! Small helpers over quick-xml shared by the part editors

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

use crate::{Error, Result};

/// Value of the attribute whose qualified name is exactly `key`.
pub(crate) fn attr(part: &str, element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::xml(part, e))?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(|e| Error::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Value of the first prefixed attribute with local name `local`
/// (e.g. `r:id` for `local = b"id"`), whatever the prefix is.
pub(crate) fn prefixed_attr(
    part: &str,
    element: &BytesStart<'_>,
    local: &[u8],
) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::xml(part, e))?;
        if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == local {
            let value = attr.unescape_value().map_err(|e| Error::xml(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

pub(crate) fn is(element: &BytesStart<'_>, local: &[u8]) -> bool {
    element.local_name().as_ref() == local
}

/// Copy `xml` through, dropping every `child` element for which `keep`
/// returns false and appending `append` at the end of `container`.
///
/// An empty `<container/>` is expanded so the appended elements fit.
pub(crate) fn rewrite_children<F>(
    part: &str,
    xml: &str,
    container: &[u8],
    child: &[u8],
    mut keep: F,
    append: &[BytesStart<'static>],
) -> Result<String>
where
    F: FnMut(&BytesStart<'_>) -> Result<bool>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| Error::xml(part, e))?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if is(&e, child) => {
                if keep(&e)? {
                    write(part, &mut writer, Event::Start(e))?;
                } else {
                    skip_depth = 1;
                }
            }
            Event::Empty(e) if is(&e, child) => {
                if keep(&e)? {
                    write(part, &mut writer, Event::Empty(e))?;
                }
            }
            Event::End(e) if e.local_name().as_ref() == container => {
                for element in append {
                    write(part, &mut writer, Event::Empty(element.clone()))?;
                }
                write(part, &mut writer, Event::End(e))?;
            }
            Event::Empty(e) if is(&e, container) => {
                let end = e.to_end().into_owned();
                write(part, &mut writer, Event::Start(e))?;
                for element in append {
                    write(part, &mut writer, Event::Empty(element.clone()))?;
                }
                write(part, &mut writer, Event::End(end))?;
            }
            other => write(part, &mut writer, other)?,
        }
    }

    into_string(part, writer)
}

pub(crate) fn write(part: &str, writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(|e| Error::xml(part, e))
}

pub(crate) fn into_string(part: &str, writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|e| Error::xml(part, e))
}
