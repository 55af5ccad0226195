use crate::error::SheetsmithError;
use crate::extraction::{ensure_pdf, Fragment, PageFragments, PdfExtractor};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout`, which reports every word with its bounding
/// box grouped into lines. Neighbouring words on a line are joined back into
/// runs so that a multi-word cell stays one fragment. Poppler measures boxes
/// from the top of the page; fragments are converted to PDF baseline space so
/// that a larger `y` is higher on the page.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageFragments>, SheetsmithError> {
        ensure_pdf(pdf_bytes)?;

        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| SheetsmithError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| SheetsmithError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SheetsmithError::PdftotextNotFound
                } else {
                    SheetsmithError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(SheetsmithError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let pages = parse_bbox_xml(&xml)?;
        tracing::debug!(pages = pages.len(), "pdftotext decoded document");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Largest gap between two words of one run, as a fraction of word height.
const RUN_GAP_RATIO: f32 = 0.5;

#[derive(Debug, Default)]
struct WordBox {
    x_min: f32,
    x_max: f32,
    y_min: f32,
    y_max: f32,
}

/// Consecutive words of one line that read as a single cell.
#[derive(Debug)]
struct Run {
    text: String,
    x_min: f32,
    x_max: f32,
    y_max: f32,
}

impl Run {
    fn continues_with(&self, word: &WordBox) -> bool {
        let height = (word.y_max - word.y_min).abs();
        let gap = word.x_min - self.x_max;
        gap >= 0.0 && gap <= height * RUN_GAP_RATIO
    }

    fn into_fragment(self, page_height: f32) -> Fragment {
        Fragment {
            text: self.text,
            x: self.x_min,
            y: page_height - self.y_max,
            width: self.x_max - self.x_min,
        }
    }
}

struct PageBuilder {
    page: PageFragments,
    height: f32,
    run: Option<Run>,
}

impl PageBuilder {
    fn add_word(&mut self, word: WordBox, text: &str, in_line: bool) {
        if let Some(run) = self.run.as_mut() {
            if in_line && run.continues_with(&word) {
                run.text.push(' ');
                run.text.push_str(text);
                run.x_max = word.x_max;
                return;
            }
        }
        self.flush();
        self.run = Some(Run {
            text: text.to_string(),
            x_min: word.x_min,
            x_max: word.x_max,
            y_max: word.y_max,
        });
        if !in_line {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if let Some(run) = self.run.take() {
            self.page.fragments.push(run.into_fragment(self.height));
        }
    }
}

/// Parse `pdftotext -bbox-layout` XHTML into per-page fragments.
///
/// Plain `-bbox` output, which has no `<line>` elements, yields one fragment
/// per word.
fn parse_bbox_xml(xml: &str) -> Result<Vec<PageFragments>, SheetsmithError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages = Vec::new();
    let mut current: Option<PageBuilder> = None;
    let mut in_line = false;
    let mut word: Option<WordBox> = None;
    let mut word_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => {
                    current = Some(PageBuilder {
                        page: PageFragments {
                            page_number: pages.len() + 1,
                            fragments: Vec::new(),
                        },
                        height: attr_f32(&e, b"height")?.unwrap_or(0.0),
                        run: None,
                    });
                }
                b"line" => in_line = true,
                b"word" => {
                    word = Some(WordBox {
                        x_min: attr_f32(&e, b"xMin")?.unwrap_or(0.0),
                        x_max: attr_f32(&e, b"xMax")?.unwrap_or(0.0),
                        y_min: attr_f32(&e, b"yMin")?.unwrap_or(0.0),
                        y_max: attr_f32(&e, b"yMax")?.unwrap_or(0.0),
                    });
                    word_text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"page" => {
                pages.push(PageFragments {
                    page_number: pages.len() + 1,
                    fragments: Vec::new(),
                });
            }
            Ok(Event::Text(t)) => {
                if word.is_some() {
                    let text = t
                        .unescape()
                        .map_err(|e| SheetsmithError::Extraction(e.to_string()))?;
                    word_text.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"word" => {
                    if let (Some(b), Some(builder)) = (word.take(), current.as_mut()) {
                        let text = word_text.trim();
                        if !text.is_empty() {
                            builder.add_word(b, text, in_line);
                        }
                    }
                }
                b"line" => {
                    in_line = false;
                    if let Some(builder) = current.as_mut() {
                        builder.flush();
                    }
                }
                b"page" => {
                    if let Some(mut builder) = current.take() {
                        builder.flush();
                        pages.push(builder.page);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetsmithError::Extraction(format!(
                    "malformed pdftotext output at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(pages)
}

fn attr_f32(tag: &BytesStart<'_>, name: &[u8]) -> Result<Option<f32>, SheetsmithError> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| SheetsmithError::Extraction(e.to_string()))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| SheetsmithError::Extraction(e.to_string()))?;
            return Ok(value.trim().parse().ok());
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::reconstruct_rows;
    use crate::table::header::locate_header;
    use crate::table::normalize::normalize_row;

    const SAMPLE: &str = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title></title>
<meta name="Producer" content="pdftotext"/>
</head>
<body>
<doc>
  <page width="612.000000" height="792.000000">
    <word xMin="72.000000" yMin="90.000000" xMax="130.500000" yMax="102.000000">Description</word>
    <word xMin="400.000000" yMin="90.000000" xMax="440.000000" yMax="102.000000">Amount</word>
    <word xMin="72.000000" yMin="110.000000" xMax="100.000000" yMax="122.000000">AT&amp;T</word>
  </page>
  <page width="612.000000" height="792.000000">
  </page>
</doc>
</body>
</html>"#;

    #[test]
    fn parses_words_into_baseline_space() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].fragments.len(), 3);

        let first = &pages[0].fragments[0];
        assert_eq!(first.text, "Description");
        assert_eq!(first.x, 72.0);
        assert_eq!(first.y, 690.0);
        assert_eq!(first.width, 58.5);
    }

    #[test]
    fn lower_words_have_smaller_y() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        let header = &pages[0].fragments[0];
        let data = &pages[0].fragments[2];
        assert_eq!(data.text, "AT&T");
        assert!(data.y < header.y);
    }

    const LAYOUT_SAMPLE: &str = r#"<html xmlns="http://www.w3.org/1999/xhtml">
<body>
<doc>
  <page width="612.000000" height="792.000000">
    <flow>
      <block xMin="72.000000" yMin="90.000000" xMax="545.000000" yMax="122.000000">
        <line xMin="72.000000" yMin="90.000000" xMax="545.000000" yMax="102.000000">
          <word xMin="72.000000" yMin="90.000000" xMax="130.000000" yMax="102.000000">Description</word>
          <word xMin="160.000000" yMin="90.000000" xMax="190.000000" yMax="102.000000">Active</word>
          <word xMin="193.000000" yMin="90.000000" xMax="215.000000" yMax="102.000000">Days</word>
          <word xMin="240.000000" yMin="90.000000" xMax="280.000000" yMax="102.000000">Prepaid</word>
          <word xMin="283.000000" yMin="90.000000" xMax="330.000000" yMax="102.000000">Quantity</word>
          <word xMin="360.000000" yMin="90.000000" xMax="400.000000" yMax="102.000000">Monthly</word>
          <word xMin="403.000000" yMin="90.000000" xMax="425.000000" yMax="102.000000">Rate</word>
          <word xMin="460.000000" yMin="90.000000" xMax="500.000000" yMax="102.000000">Prepaid</word>
          <word xMin="503.000000" yMin="90.000000" xMax="545.000000" yMax="102.000000">Amount</word>
        </line>
        <line xMin="72.000000" yMin="110.000000" xMax="532.000000" yMax="122.000000">
          <word xMin="72.000000" yMin="110.000000" xMax="115.000000" yMax="122.000000">Network</word>
          <word xMin="118.000000" yMin="110.000000" xMax="160.000000" yMax="122.000000">Service</word>
          <word xMin="180.000000" yMin="110.000000" xMax="192.000000" yMax="122.000000">30</word>
          <word xMin="260.000000" yMin="110.000000" xMax="266.000000" yMax="122.000000">2</word>
          <word xMin="380.000000" yMin="110.000000" xMax="412.000000" yMax="122.000000">$10.00</word>
          <word xMin="500.000000" yMin="110.000000" xMax="532.000000" yMax="122.000000">$20.00</word>
        </line>
      </block>
    </flow>
  </page>
</doc>
</body>
</html>"#;

    #[test]
    fn words_on_a_line_join_into_runs() {
        let pages = parse_bbox_xml(LAYOUT_SAMPLE).unwrap();
        let fragments = &pages[0].fragments;
        assert_eq!(fragments.len(), 10);

        let days = fragments.iter().find(|f| f.text == "Active Days").unwrap();
        assert_eq!(days.x, 160.0);
        assert_eq!(days.width, 55.0);
        assert_eq!(days.y, 690.0);
        assert!(fragments.iter().any(|f| f.text == "Network Service"));
        assert!(fragments.iter().all(|f| f.text != "Service"));
    }

    #[test]
    fn multi_word_cells_map_to_their_columns() {
        let layout = crate::profile::builtin::statement_layout().unwrap();
        let prepay = &layout.prepay;
        let pages = parse_bbox_xml(LAYOUT_SAMPLE).unwrap();
        let rows = reconstruct_rows(&pages[0].fragments);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 5);
        assert_eq!(rows[1].len(), 5);

        let map = locate_header(&rows[0], &prepay.columns, prepay.min_matches).unwrap();
        assert_eq!(
            normalize_row(&rows[1], &map, &prepay.keys()),
            vec!["Network Service", "30", "2", "$10.00", "$20.00"]
        );
    }

    #[test]
    fn empty_page_is_kept() {
        let pages = parse_bbox_xml(SAMPLE).unwrap();
        assert_eq!(pages[1].page_number, 2);
        assert!(pages[1].fragments.is_empty());
    }
}
