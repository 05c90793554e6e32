use claimcheck_ingest::{DEFAULT_CAPTION, GraphFormat};
use claimcheck_kernel::AnchorProfile;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "claimcheck",
    about = "Claimcheck: batch checks for claims registries, dependency graphs, and paper assets",
    version
)]
pub struct Cli {
    /// Path to a TOML config file (built-in defaults when omitted)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the claims dependency graph is acyclic and fully registered
    DagCheck {
        /// Graph source: DOT-like text or a From/To CSV edge table
        graph: String,

        /// Path to the claims registry YAML
        #[arg(long)]
        claims: String,

        /// Also check every edge endpoint against the identifier format
        #[arg(long)]
        strict: bool,

        /// Graph syntax; `auto` picks CSV for `.csv` files
        #[arg(long, value_enum, default_value_t = GraphFormatArg::Auto)]
        format: GraphFormatArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the claims registry for duplicates and undeclared Lean IDs
    ClaimsCheck {
        /// Path to the claims registry YAML
        #[arg(long)]
        claims: String,

        /// Directory scanned for `-- ID:` headers in `.lean` files
        #[arg(long)]
        lean: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check LaTeX refs, theorem-label coverage, and figure paths
    ProjectCheck {
        /// LaTeX project root
        #[arg(long, default_value = ".")]
        root: String,

        /// Claims registry YAML; enables theorem-label coverage
        #[arg(long)]
        claims: Option<String>,

        /// Lean source directory; enables Lean ID coverage (needs --claims)
        #[arg(long)]
        lean: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List referenced-but-missing and present-but-unused figures
    AssetCheck {
        /// LaTeX project root
        #[arg(long, default_value = ".")]
        root: String,

        /// Comma-separated image extensions (config defaults when omitted)
        #[arg(long)]
        ext: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lexical check of LossForm / ReferenceLemma columns
    LossFormsCheck {
        /// Bridges CSV
        #[arg(long)]
        bridges: Option<String>,

        /// Relaxations CSV
        #[arg(long)]
        relax: Option<String>,

        /// DAG CSV
        #[arg(long)]
        dag: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse bridge loss forms and check that they compose
    BridgesCheck {
        /// Bridges CSV with LossForm, Parameters, ReferenceLemma
        #[arg(long)]
        csv: String,

        /// Path to the claims registry YAML
        #[arg(long)]
        claims: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check extracted paper text for required anchors
    AnchorCheck {
        /// Extracted text (e.g. `pdftotext main.pdf paper.txt`)
        #[arg(long, default_value = "paper.txt")]
        text: String,

        /// Anchor profile
        #[arg(long, value_enum, default_value_t = AnchorProfileArg::Stoc)]
        profile: AnchorProfileArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a CSV table as a LaTeX table environment
    CsvTable {
        /// Input CSV
        #[arg(long)]
        csv: String,

        /// Output `.tex` file
        #[arg(long)]
        out: String,

        /// Table caption
        #[arg(long, default_value = DEFAULT_CAPTION)]
        caption: String,
    },
}

#[derive(Clone, Debug, ValueEnum)]
pub enum GraphFormatArg {
    #[value(name = "auto")]
    Auto,
    #[value(name = "dot")]
    Dot,
    #[value(name = "csv")]
    Csv,
}

impl From<GraphFormatArg> for GraphFormat {
    fn from(value: GraphFormatArg) -> Self {
        match value {
            GraphFormatArg::Auto => GraphFormat::Auto,
            GraphFormatArg::Dot => GraphFormat::Dot,
            GraphFormatArg::Csv => GraphFormat::Csv,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum AnchorProfileArg {
    #[value(name = "stoc")]
    Stoc,
    #[value(name = "internal")]
    Internal,
}

impl From<AnchorProfileArg> for AnchorProfile {
    fn from(value: AnchorProfileArg) -> Self {
        match value {
            AnchorProfileArg::Stoc => AnchorProfile::Stoc,
            AnchorProfileArg::Internal => AnchorProfile::Internal,
        }
    }
}
