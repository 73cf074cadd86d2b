//! Strategy listing command.

use super::banner;
use malaga::signals::registry::available_strategies;

/// Lists every screen with its score column and default output file.
pub(crate) fn list_strategies(verbose: bool) {
    banner("Available Strategies");

    for info in available_strategies() {
        if verbose {
            println!("{}", info.name);
            println!("  {}", info.kind.description());
            match info.score_column {
                Some(column) => {
                    let order = if info.higher_is_better {
                        "highest first"
                    } else {
                        "lowest first"
                    };
                    println!("  score:        {column} ({order})");
                }
                None => println!("  score:        none"),
            }
            println!("  fundamentals: {}", if info.requires_fundamentals { "yes" } else { "no" });
            println!("  output:       {}\n", info.default_output);
        } else {
            println!("  {:18} {}", info.name, info.kind.description());
        }
    }

    if !verbose {
        println!("\nUse --verbose for score columns and output files.\n");
    }
}
