use lattice::component;

/// Formats cent amounts for display
///
/// Discovered with the rest of `app::business` but satisfies no contract,
/// so registration binds nothing for it. Controllers use it directly.
#[component]
pub struct CurrencyFormat;

impl CurrencyFormat {
    pub fn format(&self, cents: u64) -> String {
        format!("${}.{:02}", cents / 100, cents % 100)
    }
}
