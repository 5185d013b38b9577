use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

/// Final state of a vm after a run, printed by the cli when debugging is enabled
#[derive(Debug, PartialEq, Clone)]
pub struct TcDebugReport {
    pub stack: Vec<i64>,
    pub labels: BTreeMap<i64, usize>,
    pub elapsed: Duration,
}

impl Display for TcDebugReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{:?}", self.stack)?;
        let labels = self
            .labels
            .iter()
            .map(|(label, line)| format!("{}: {}", label, line))
            .collect::<Vec<_>>();
        writeln!(f, "{{{}}}", labels.join(", "))?;
        write!(f, "interpreted in {:.4} s", self.elapsed.as_secs_f64())
    }
}
