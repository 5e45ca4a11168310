use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "vkcomments",
    version = "1.0",
    about = "Exports commenters on a VK community's wall to .xlsx spreadsheets."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Command to collect commented posts from a community wall and export
    /// every commenter with their comment text. Any value not supplied here
    /// or via the environment is prompted for interactively.
    Export {
        /// Domain name of the VK community.
        #[arg(long, short, help = "VK community domain name", required = false)]
        group: Option<String>,

        /// Number of posts with comments to process.
        #[arg(long, short, help = "Number of posts to process", required = false)]
        count: Option<usize>,

        /// VK API access token. Falls back to VK_ACCESS_TOKEN.
        #[arg(long, short, help = "VK API access token", required = false)]
        token: Option<String>,

        /// Combined output filename.
        /// Batch files get the batch number appended to this name.
        #[arg(
            long,
            short,
            help = "Combined output file (default: <group>_comment_users.xlsx)",
            required = false
        )]
        output: Option<String>,
    },
}
