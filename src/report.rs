use anyhow::Result;

use crate::bundle::EvidenceBundle;

/// Renders an evidence bundle into a paginated plain-text forensic report.
///
/// Every line is truncated to the page width; when the per-page line budget
/// runs out, a form-feed page break is emitted and the section continues on
/// the next page.
pub struct ReportRenderer {
    page_width: usize,
    page_lines: usize,
    max_body_lines: usize,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self {
            page_width: 100,
            page_lines: 56,
            max_body_lines: 60,
        }
    }
}

struct PageWriter {
    out: String,
    width: usize,
    lines_per_page: usize,
    lines_on_page: usize,
}

impl PageWriter {
    fn new(width: usize, lines_per_page: usize) -> Self {
        Self {
            out: String::new(),
            width,
            lines_per_page,
            lines_on_page: 0,
        }
    }

    fn line(&mut self, text: &str) {
        if self.lines_on_page >= self.lines_per_page {
            self.break_page();
        }
        let truncated: String = text.chars().take(self.width).collect();
        self.out.push_str(&truncated);
        self.out.push('\n');
        self.lines_on_page += 1;
    }

    fn blank(&mut self) {
        self.line("");
    }

    fn break_page(&mut self) {
        self.out.push('\x0c');
        self.lines_on_page = 0;
    }

    fn finish(self) -> Vec<u8> {
        self.out.into_bytes()
    }
}

impl ReportRenderer {
    pub fn new(page_width: usize, page_lines: usize, max_body_lines: usize) -> Self {
        Self {
            page_width,
            page_lines,
            max_body_lines,
        }
    }

    /// Render the full forensic report as a byte stream.
    pub fn render(&self, bundle: &EvidenceBundle) -> Result<Vec<u8>> {
        let mut w = PageWriter::new(self.page_width, self.page_lines);

        w.line("PHISHING EMAIL FORENSIC REPORT");
        w.line(&format!(
            "Generated: {}",
            bundle.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        w.line(&format!(
            "Prediction: {}    Confidence: {}%    Risk Score: {}",
            bundle.classifier.label, bundle.classifier.confidence, bundle.score
        ));
        w.blank();

        w.line("Threat Keywords:");
        if bundle.keywords.is_empty() {
            w.line("  None detected");
        } else {
            for kw in &bundle.keywords {
                w.line(&format!("  - {kw}"));
            }
        }
        w.blank();

        w.line("Extracted URLs:");
        if bundle.urls.is_empty() {
            w.line("  None found");
        } else {
            for url in &bundle.urls {
                w.line(&format!("  - {url}"));
            }
        }
        w.blank();

        w.line("Domain Registration Summary:");
        if bundle.registrations.is_empty() {
            w.line("  No domains to look up");
        } else {
            for record in &bundle.registrations {
                w.line(&format!("  {}", record.summary_line()));
                if let Some(err) = &record.lookup_error {
                    w.line(&format!("    lookup error: {err}"));
                }
            }
        }
        w.blank();

        w.line("Network Ownership Summary:");
        match &bundle.ownership {
            Some(record) => w.line(&format!("  {}", record.summary_line())),
            None => w.line("  No domain or address candidate found"),
        }
        w.blank();

        w.line("Email Content (truncated):");
        for line in bundle.text.lines().take(self.max_body_lines) {
            w.line(&format!("  {line}"));
        }

        Ok(w.finish())
    }
}
