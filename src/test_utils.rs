pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        /// Press Enter
        pub fn press_enter(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Enter,
                KeyModifiers::empty(),
            ));
            self
        }

        /// Press Esc
        pub fn press_esc(mut self) -> Self {
            self.events.push(SimulatedEventSource::key_event(
                KeyCode::Esc,
                KeyModifiers::empty(),
            ));
            self
        }

        /// Drag with the left button from one terminal cell to another
        pub fn drag(mut self, from: (u16, u16), to: (u16, u16)) -> Self {
            self.events
                .push(SimulatedEventSource::mouse_down(from.0, from.1));
            self.events.push(SimulatedEventSource::mouse_drag(to.0, to.1));
            self.events.push(SimulatedEventSource::mouse_up(to.0, to.1));
            self
        }

        /// Go to the next page (press 'n')
        pub fn next_page(self) -> Self {
            self.press_char('n')
        }

        /// Go to the previous page (press 'p')
        pub fn prev_page(self) -> Self {
            self.press_char('p')
        }

        /// Export the selection (press 's')
        pub fn export(self) -> Self {
            self.press_char('s')
        }

        /// Quit the application (press 'q')
        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        // Remove trailing empty lines
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }

    /// Page size of [`minimal_pdf`] pages, in points
    pub const FIXTURE_PAGE_SIZE: (u32, u32) = (300, 200);

    /// Title stored in the info dictionary of [`minimal_pdf`]
    pub const FIXTURE_TITLE: &str = "pdfsnip fixture";

    /// A small but well-formed PDF: `pages` pages of 300x200 pt, each with a
    /// blue box and a red square whose position depends on the page, and a
    /// cross-reference table with exact byte offsets
    pub fn minimal_pdf(pages: usize) -> Vec<u8> {
        let (width, height) = FIXTURE_PAGE_SIZE;
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {pages} >>",
                (0..pages)
                    .map(|i| format!("{} 0 R", 3 + 2 * i))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
        ];
        for i in 0..pages {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] /Contents {} 0 R /Resources << >> >>",
                4 + 2 * i
            ));
            let body = format!(
                "0 0 1 rg 50 50 100 60 re f\n1 0 0 rg {} 20 20 20 re f\n",
                200 + 10 * i
            );
            objects.push(format!(
                "<< /Length {} >>\nstream\n{body}endstream",
                body.len()
            ));
        }
        objects.push(format!("<< /Title ({FIXTURE_TITLE}) >>"));
        let info_id = objects.len();

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{object}\nendobj\n", index + 1));
        }

        let xref_offset = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
        pdf.push_str("0000000000 65535 f \n");
        for offset in &offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R /Info {info_id} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));

        pdf.into_bytes()
    }
}
