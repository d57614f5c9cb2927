use metier_common::chain::Catalog;
use metier_node::logger;
use metier_node::options::{self, Options};
use metier_node::resolver;

fn main() {
    let catalog = Catalog::default();
    let opts = match Options::from_env(&catalog) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("ERROR: {}\n\n{}", err, options::usage(&catalog));
            std::process::exit(1);
        }
    };

    logger::init(opts.log).expect("initializing logger for the first time");

    for name in opts.ignored.iter() {
        log::warn!("Ignoring unrecognized option --{}", name);
    }
    let cfg = resolver::resolve(&catalog, opts.pairs);

    if let Err(err) = metier_node::run(cfg, &catalog) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
