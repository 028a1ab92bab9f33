//! ASC 450 - Contingencies

use super::{StandardSpec, StepSpec};

pub const ASC_450: StandardSpec = StandardSpec {
    form_type: "asc450",
    title: "ASC 450 Contingencies",
    steps: &[
        StepSpec {
            name: "Contingency Identification",
            label: "Contingency Identification",
            patterns: &[r"contingent liability", r"potential loss event"],
        },
        StepSpec {
            name: "Loss Probability Assessment",
            label: "Loss Probability Assessment",
            patterns: &[r"probability of loss", r"likelihood of adverse outcome"],
        },
        StepSpec {
            name: "Estimate of Loss Amount",
            label: "Estimate of Loss Amount",
            patterns: &[r"estimated loss amount", r"potential financial impact"],
        },
        StepSpec {
            name: "Recognition and Measurement",
            label: "Recognition and Measurement",
            patterns: &[r"contingency measurement", r"liability recognition"],
        },
        StepSpec {
            name: "Disclosure of Contingencies",
            label: "Disclosure of Contingencies",
            patterns: &[
                r"disclosure of contingency",
                r"information required for contingencies",
            ],
        },
    ],
};
