//! Canned modem response profiles

use std::collections::HashMap;

/// Maps requests to the reply lines a simulated modem produces
///
/// Requests without an entry fall back to a bare `OK`, which covers the
/// long tail of set-and-forget configuration commands.
#[derive(Debug, Clone, Default)]
pub struct ResponseProfile {
    responses: HashMap<String, Vec<String>>,
}

impl ResponseProfile {
    /// An empty profile; everything answers `OK`
    pub fn new() -> Self {
        Self::default()
    }

    /// A generic registered modem with plausible identity data
    pub fn generic() -> Self {
        let mut profile = Self::new();
        profile.set("AT+CREG?", &["+CREG: 0,1", "OK"]);
        profile.set("AT+CEREG?", &["+CEREG: 0,4", "OK"]);
        profile.set("AT+CGREG?", &["+CGREG: 0,0", "OK"]);
        profile.set("AT+CGSN", &["490154203237518", "OK"]);
        profile.set("AT+CGMM", &["EG25", "OK"]);
        profile.set("AT+CGMI", &["Quectel", "OK"]);
        profile.set("AT+CGMR", &["EG25GGBR07A08M2G", "OK"]);
        profile.set("AT+CIMI", &["901288003000075", "OK"]);
        profile.set("AT+QCCID", &["+QCCID: 89882390000117958765", "OK"]);
        profile.set("AT+CSQ", &["+CSQ: 21,99", "OK"]);
        profile.set("ATD*99***1#", &["CONNECT"]);
        profile
    }

    /// Set the reply lines for one request
    pub fn set(&mut self, request: &str, lines: &[&str]) {
        self.responses.insert(
            request.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
    }

    /// Reply lines for a request; unknown requests answer `OK`
    pub fn lines_for(&self, request: &str) -> Vec<String> {
        match self.responses.get(request) {
            Some(lines) => lines.clone(),
            None => vec!["OK".to_string()],
        }
    }
}
