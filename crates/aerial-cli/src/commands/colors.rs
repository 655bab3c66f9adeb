//! Colors command - convert hex colors to RGB and CMYK.

use clap::Args;
use serde::Serialize;

use aerial_core::{Cmyk, Rgb, hex_to_rgb, rgb_to_cmyk};

/// Arguments for the colors command.
#[derive(Args)]
pub struct ColorsArgs {
    /// Hex colors such as "#1f3b6e" or "d81e2c"
    #[arg(required = true)]
    colors: Vec<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ConvertedColor {
    hex: String,
    rgb: Rgb,
    cmyk: Cmyk,
}

pub async fn run(args: ColorsArgs) -> anyhow::Result<()> {
    let converted = args
        .colors
        .iter()
        .map(|hex| {
            let rgb = hex_to_rgb(hex)?;
            Ok(ConvertedColor {
                hex: rgb.to_hex(),
                rgb,
                cmyk: rgb_to_cmyk(rgb),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&converted)?);
        return Ok(());
    }

    for color in &converted {
        println!(
            "{}  rgb({})  cmyk({})",
            color.hex, color.rgb, color.cmyk
        );
    }

    Ok(())
}
