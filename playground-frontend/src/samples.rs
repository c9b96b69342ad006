//! Sample programs offered by the hosts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub source: &'static str,
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "hello",
        source: "print \"hello, playground\"\n",
    },
    Sample {
        name: "arithmetic",
        source: "let width: Int = 12\n\
                 let height: Int = 5\n\
                 let area = width * height\n\
                 print area - (width + height)\n",
    },
    Sample {
        name: "strings",
        source: "// strings concatenate with +\n\
                 let greeting = \"hello\"\n\
                 let name: String = \"world\"\n\
                 print greeting + \", \" + name\n",
    },
    Sample {
        name: "flags",
        source: "let verbose: Bool = true;\n\
                 let quiet = false;\n\
                 print verbose;\n\
                 print quiet;\n",
    },
];

/// Look up a sample by name.
pub fn find_sample(name: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|sample| sample.name == name)
}
