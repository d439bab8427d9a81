use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipgrab")]
#[command(version)]
#[command(about = "Extract single members from remote ZIP archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipgrab -l https://example.com/archive.zip      list archive members\n  \
  zipgrab https://example.com/archive.zip a.txt   extract a.txt only\n  \
  zipgrab -d out https://example.com/archive.zip  extract everything into out/")]
pub struct Cli {
    /// URL of the remote ZIP archive
    #[arg(value_name = "URL")]
    pub url: String,

    /// Members to extract (default: all)
    #[arg(value_name = "MEMBERS")]
    pub members: Vec<String>,

    /// List members (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List members verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract members into DIR
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// User-Agent header sent with every request
    #[arg(short = 'A', long = "user-agent", value_name = "UA")]
    pub user_agent: Option<String>,

    /// Quiet mode
    #[arg(short = 'q')]
    pub quiet: bool,
}
