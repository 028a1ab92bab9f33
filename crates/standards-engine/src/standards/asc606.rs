//! ASC 606 - Revenue from Contracts with Customers
//!
//! The five-step revenue recognition model. Found steps are reported under
//! the action heading ("Identify Contract"); missing steps under the
//! descriptive heading ("Contract Identification").

use super::{StandardSpec, StepSpec};

pub const ASC_606: StandardSpec = StandardSpec {
    form_type: "asc606",
    title: "ASC 606 Revenue Recognition",
    steps: &[
        StepSpec {
            name: "Identify Contract",
            label: "Contract Identification",
            patterns: &[r"contract.*?with.*?customer", r"agreement.*?between.*?parties"],
        },
        StepSpec {
            name: "Identify Performance Obligations",
            label: "Performance Obligations",
            patterns: &[
                r"performance obligation.*?(include|consist of)",
                r"obligation.*?to provide",
            ],
        },
        StepSpec {
            name: "Determine Transaction Price",
            label: "Transaction Price Determination",
            patterns: &[r"transaction price.*?(is|amounts to)", r"fee.*?for services"],
        },
        StepSpec {
            name: "Allocate Transaction Price",
            label: "Transaction Price Allocation",
            patterns: &[
                r"allocate.*?price.*?to.*?obligations",
                r"pricing allocation.*?obligations",
            ],
        },
        StepSpec {
            name: "Recognize Revenue",
            label: "Revenue Recognition",
            patterns: &[
                r"revenue.*?recognition.*?(when|upon)",
                r"satisfaction.*?performance obligation",
            ],
        },
    ],
};
