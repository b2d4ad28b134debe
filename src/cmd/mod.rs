use crate::repository::cache::MemoryCacheService;
use crate::repository::transport::UdpTransport;
use crate::report::HostReport;
use crate::resolver::Resolver;
use clap::Parser;

/// Iterative DNS lookup: walks the delegation chain from the root servers
/// and prints the CNAME, A, AAAA and MX records of each name
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase output verbosity (accepted for compatibility)
    #[arg(short, long)]
    verbose: bool,
    /// DNS name(s) to look up
    #[arg(required = true)]
    names: Vec<String>,
}

impl Args {
    pub async fn run(self) {
        if self.verbose {
            tracing::debug!("verbose flag is accepted but changes nothing");
        }

        let resolver = Resolver::new(UdpTransport::default(), MemoryCacheService::default());
        for name in &self.names {
            let report = HostReport::collect(&resolver, name).await;
            print!("{report}");
        }
    }
}
