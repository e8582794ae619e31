pub type Result<T> = std::result::Result<T, String>;

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

/// Share of `count` in `total`, zero when nothing was observed.
pub fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_empty_total_is_zero() {
        assert_eq!(fraction(3, 0), 0.0);
        assert_eq!(fraction(1, 4), 0.25);
    }
}
