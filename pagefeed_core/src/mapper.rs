/// Maps raw feed entries into whatever the presentation layer renders.
///
/// Implementations carry their own formatting context (locale, duration
/// formatting, navigation handles). Mapping is synchronous and total: a
/// fetched entry always produces an item, and fallback rendering for odd
/// values belongs inside the item itself.
pub trait EntryMapper<E> {
    /// Display-ready value appended to the visible list.
    type Item;

    fn map_entry(&self, entry: E) -> Self::Item;
}
