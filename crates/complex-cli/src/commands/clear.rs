use crate::cli::ClearArgs;
use crate::error::{CliError, Result};
use pdbcomplex::engine::store::{GraphStore, SnapshotGraphStore};
use tracing::info;

pub fn run(args: ClearArgs) -> Result<()> {
    if !args.graph.exists() {
        return Err(CliError::Argument(format!(
            "Graph snapshot does not exist: {}",
            args.graph.display()
        )));
    }

    let mut store = SnapshotGraphStore::open(&args.graph)?;
    if args.all {
        info!("Removing all state from {:?}", &args.graph);
        store.clear_all();
    } else {
        info!("Removing derived state from {:?}", &args.graph);
        // Infallible for snapshot stores.
        let Ok(()) = store.clear_derived();
    }
    store.save()?;

    println!(
        "✓ Cleared {} state in: {}",
        if args.all { "all" } else { "derived" },
        args.graph.display()
    );
    Ok(())
}
