//! Output files of the H2iVDI discharge algorithm.

use ndarray::Array1;

use crate::error::Result;
use crate::source::{Attribute, Session, Source};

/// Which status attribute to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Global,
    Vda,
}

/// Parameters and discharge estimated for one reach.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeOutput {
    pub status: Option<Attribute>,
    pub vda_status: Option<Attribute>,
    pub t: Array1<f64>,
    pub a0: f64,
    pub alpha: f64,
    pub beta: f64,
    pub q: Array1<f64>,
}

impl DischargeOutput {
    pub fn load<S: Source>(session: &Session<S>) -> Result<DischargeOutput> {
        let root = session.root()?;
        let reach = session.group("reach")?;

        Ok(DischargeOutput {
            status: root.attribute("status")?,
            vda_status: root.attribute("VDA_status")?,
            t: Array1::from(root.read("nt")?.floats()?),
            a0: reach.read("A0")?.scalar_f64()?,
            alpha: reach.read("alpha")?.scalar_f64()?,
            beta: reach.read("beta")?.scalar_f64()?,
            q: Array1::from(reach.read("Q")?.floats()?),
        })
    }

    pub fn status(&self, which: Status) -> Option<&Attribute> {
        match which {
            Status::Global => self.status.as_ref(),
            Status::Vda => self.vda_status.as_ref(),
        }
    }

    /// Estimated discharge along `t`.
    pub fn discharge(&self) -> &Array1<f64> {
        &self.q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::source::{MemoryGroup, MemorySource, MemoryVariable};

    fn output() -> MemorySource {
        MemorySource::new()
            .attribute("status", Attribute::Int(0))
            .attribute("VDA_status", Attribute::Str("converged".into()))
            .variable(MemoryVariable::new("nt", &["nt"], vec![0.0, 21.0, 42.0]))
            .group(
                "reach",
                MemoryGroup::new()
                    .variable(MemoryVariable::scalar("A0", 120.0))
                    .variable(MemoryVariable::scalar("alpha", -9999.0).fill_value(-9999.0))
                    .variable(MemoryVariable::scalar("beta", 0.3))
                    .variable(
                        MemoryVariable::new("Q", &["nt"], vec![10.0, -1.0e9, 30.0])
                            .fill_value(-1.0e9),
                    ),
            )
    }

    #[test]
    fn load() {
        let s = Session::new(output());
        let o = DischargeOutput::load(&s).unwrap();

        assert_eq!(o.status(Status::Global), Some(&Attribute::Int(0)));
        assert_eq!(
            o.status(Status::Vda).map(|s| s.to_string()),
            Some("converged".to_string())
        );
        assert_eq!(o.t.len(), 3);
        assert_eq!(o.a0, 120.0);
        assert!(o.alpha.is_nan());
        assert_eq!(o.beta, 0.3);
        assert!(o.discharge()[1].is_nan());
    }

    #[test]
    fn missing_reach_group() {
        let s = Session::new(MemorySource::new());
        assert!(matches!(
            DischargeOutput::load(&s),
            Err(Error::StructuralMismatch(_))
        ));
    }
}
