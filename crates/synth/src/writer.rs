/// Line-oriented Go source writer with tab indentation
#[derive(Debug, Default)]
pub(crate) struct GoWriter {
    buf: String,
    depth: usize,
}

impl GoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push('\t');
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write `open`, indent, run `body`, dedent, write `}`
    pub fn block(&mut self, open: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.enclosed(open, "}", body);
    }

    pub fn enclosed(&mut self, open: impl AsRef<str>, close: &str, body: impl FnOnce(&mut Self)) {
        self.line(open);
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line(close);
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
