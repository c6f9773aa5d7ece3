/// Where a resolved module's bytes were found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Location {
    /// The module was already present in the installed catalog.
    Installed,
    /// The module was only found in a remote repository and still needs fetching.
    Remote,
}
