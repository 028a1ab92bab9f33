//! IFRS 15 - Revenue from Contracts with Customers

use super::{StandardSpec, StepSpec};

pub const IFRS_15: StandardSpec = StandardSpec {
    form_type: "ifrs15",
    title: "IFRS 15 Revenue from Contracts with Customers",
    steps: &[
        StepSpec {
            name: "Contract Identification",
            label: "Contract Identification",
            patterns: &[r"contract with customer", r"agreement details"],
        },
        StepSpec {
            name: "Performance Obligations Identification",
            label: "Performance Obligations Identification",
            patterns: &[r"performance obligations include", r"list of obligations"],
        },
        StepSpec {
            name: "Transaction Price Determination (Multi-Currency)",
            label: "Transaction Price Determination (Multi-Currency)",
            patterns: &[r"transaction price in foreign currency", r"price allocation"],
        },
        StepSpec {
            name: "Allocation of Transaction Price",
            label: "Allocation of Transaction Price",
            patterns: &[r"allocating price to obligations", r"price breakdown by performance"],
        },
        StepSpec {
            name: "Revenue Recognition Timing",
            label: "Revenue Recognition Timing",
            patterns: &[r"revenue recognized.*?completion", r"timing of revenue recognition"],
        },
    ],
};
