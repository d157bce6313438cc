use nalgebra::{DMatrix, DVector};
use std::io::Write;
use std::path::Path;

/// Append-only history of a closed-loop run: three aligned sequences with
/// one entry per sampling instant. An iteration is either fully recorded or
/// not recorded at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingRecord {
    /// Sample times (s)
    pub times: Vec<f64>,
    /// Measured plant states (Ca, Cb, T) at the sample times
    pub states: Vec<DVector<f64>>,
    /// Control value applied over the interval ending at each sample time
    pub controls: Vec<f64>,
}

impl SamplingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed iteration.
    pub fn push(&mut self, t: f64, state: &DVector<f64>, control: f64) {
        self.times.push(t);
        self.states.push(state.clone());
        self.controls.push(control);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// State trajectory as a matrix with one row per sample.
    pub fn states_matrix(&self) -> DMatrix<f64> {
        let rows = self.states.len();
        let cols = self.states.first().map_or(0, |s| s.len());
        DMatrix::from_fn(rows, cols, |i, j| self.states[i][j])
    }

    /// Tabular dump of the recorded run.
    pub fn pretty_print(&self) {
        use prettytable::{Table, row};

        println!("\n=== SAMPLING RECORD ({} samples) ===", self.len());
        let mut table = Table::new();
        table.add_row(row!["t [s]", "Ca [mol/l]", "Cb [mol/l]", "T [K]", "Tc [K]"]);
        for i in 0..self.len() {
            let y = &self.states[i];
            table.add_row(row![
                format!("{:.1}", self.times[i]),
                format!("{:.5}", y[0]),
                format!("{:.5}", y[1]),
                format!("{:.3}", y[2]),
                format!("{:.3}", self.controls[i]),
            ]);
        }
        table.printstd();
    }

    /// Save the record as CSV with a header row.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let mut file = std::fs::File::create(path.as_ref())?;
        writeln!(file, "t,Ca,Cb,T,Tc")?;
        for i in 0..self.len() {
            let y = &self.states[i];
            writeln!(
                file,
                "{},{},{},{},{}",
                self.times[i], y[0], y[1], y[2], self.controls[i]
            )?;
        }
        Ok(())
    }
}
