// Imports
use console::StyledObject;
use indicatif::{MultiProgress, ProgressBar};
use log::warn;

pub fn greenify(s: &str) -> String {
    console::style(s).green().to_string()
}

pub fn simple_spinner<S: ToString>(
    start_message: Option<S>,
    steady_tick_ms: Option<u64>,
    multi: Option<&MultiProgress>,
) -> ProgressBar {
    #[cfg(feature = "progress")]
    {
        let mut spinner = indicatif::ProgressBar::new_spinner().with_style(
            indicatif::ProgressStyle::default_spinner()
                .tick_chars("⊶⊷✔")
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
        );
        if let Some(ms) = steady_tick_ms {
            spinner.enable_steady_tick(std::time::Duration::from_millis(ms));
        }
        if let Some(msg) = start_message {
            spinner.set_message(msg.to_string());
        }
        if let Some(multi) = multi {
            spinner = multi.add(spinner);
            multi.set_move_cursor(true);
        }
        spinner
    }

    #[cfg(not(feature = "progress"))]
    {
        let _ = (start_message.map(|msg| msg.to_string()), steady_tick_ms, multi);
        ProgressBar::hidden()
    }
}

pub fn simple_progressbar(
    len: usize,
    text: impl std::fmt::Display,
    multi: Option<&MultiProgress>,
) -> ProgressBar {
    #[cfg(feature = "progress")]
    {
        let mut pb = indicatif::ProgressBar::new(len as u64)
            .with_style(
                indicatif::ProgressStyle::with_template(&format!(
                    "{{msg}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} {text}"
                ))
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
            )
            .with_message("⋆")
            .with_finish(indicatif::ProgressFinish::WithMessage(greenify("✔").into()));
        if let Some(multi) = multi {
            pb = multi.add(pb);
            multi.set_move_cursor(true);
        }
        pb
    }

    #[cfg(not(feature = "progress"))]
    {
        let _ = (len, text.to_string(), multi);
        ProgressBar::hidden()
    }
}

/// Terminal color matching a mean silhouette value in `[-1, 1]`
pub fn colorizer_from_silhouette<T>(score: f64) -> fn(StyledObject<T>) -> StyledObject<T> {
    match score {
        -1.0..0.0 => StyledObject::<T>::red,
        0.0..0.25 => StyledObject::<T>::yellow,
        0.25..0.5 => StyledObject::<T>::green,
        0.5..=1.0 => StyledObject::<T>::cyan,
        _ => {
            warn!("Got unexpected silhouette value of {score}");
            StyledObject::<T>::bold
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn colorizer_test() {
        let styled = colorizer_from_silhouette(0.9)(console::style("x").force_styling(true));
        assert_eq!(styled.to_string(), console::style("x").force_styling(true).cyan().to_string());
        let styled = colorizer_from_silhouette(-0.3)(console::style("x").force_styling(true));
        assert_eq!(styled.to_string(), console::style("x").force_styling(true).red().to_string());
    }
}
