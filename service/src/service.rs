//! User-facing inventory operations.
//!
//! Each [`InventoryService`] operation is one linear script: prompt for the
//! fields it needs, look up the item when it works on an existing one, issue
//! exactly one repository call that writes, and print the outcome. The
//! affected data is also returned so callers can inspect it.
//!
//! Prompts go to the [`Prompter`]'s stream and results to the service's own
//! output, so a front end can keep machine-readable results apart from the
//! interactive text.

use std::io::{self, BufRead, Write};

use stockroom_core::{Field, ITEM_FIELDS, Item, ItemRepository, NewItem, format_item};
use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};
use crate::prompt::Prompter;

/// Which field a search matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Name,
    Brand,
    Category,
    Sku,
}

impl SearchBy {
    pub fn field(self) -> Field {
        match self {
            SearchBy::Name => Field::Name,
            SearchBy::Brand => Field::Brand,
            SearchBy::Category => Field::Category,
            SearchBy::Sku => Field::Sku,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SearchBy::Name => "Search Name",
            SearchBy::Brand => "Search Brand",
            SearchBy::Category => "Search Category",
            SearchBy::Sku => "Search SKU code",
        }
    }
}

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Add,
    Subtract,
}

impl Adjustment {
    fn label(self) -> &'static str {
        match self {
            Adjustment::Add => "Amount to add",
            Adjustment::Subtract => "Amount to subtract",
        }
    }

    fn apply(self, current: i64, delta: i64) -> Option<i64> {
        match self {
            Adjustment::Add => current.checked_add(delta),
            Adjustment::Subtract => current.checked_sub(delta),
        }
    }
}

/// How results are written to the output stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One formatted line per item, plus totals and confirmations.
    #[default]
    Text,
    /// One JSON object per item per line and nothing else.
    Json,
}

/// Runs inventory operations against a repository, prompting through a
/// [`Prompter`] and writing results to `output`.
pub struct InventoryService<R, I, P, W> {
    repository: R,
    prompter: Prompter<I, P>,
    output: W,
    mode: OutputMode,
}

impl<R: ItemRepository, I: BufRead, P: Write, W: Write> InventoryService<R, I, P, W> {
    pub fn new(repository: R, prompter: Prompter<I, P>, output: W) -> Self {
        Self {
            repository,
            prompter,
            output,
            mode: OutputMode::Text,
        }
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn prompter(&self) -> &Prompter<I, P> {
        &self.prompter
    }

    /// The results stream.
    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (R, Prompter<I, P>, W) {
        (self.repository, self.prompter, self.output)
    }

    /// Prompts for every field and stores a new item.
    ///
    /// # Errors
    ///
    /// [`ServiceError::DuplicateSku`] if the SKU is taken; validation and
    /// storage errors otherwise.
    pub fn create(&mut self) -> Result<Item> {
        let mut draft = NewItem::default();
        for spec in &ITEM_FIELDS {
            let value = self.prompter.read_field(spec)?;
            draft.set(spec.field, value)?;
        }

        let item = self.repository.create(&draft)?;
        info!(id = item.id, sku = %item.sku, "item created");
        self.show(&item)?;
        Ok(item)
    }

    /// Prompts for a search value and prints every match with a total.
    ///
    /// A search by SKU yields at most one item. No match is an empty result.
    pub fn search(&mut self, by: SearchBy) -> Result<Vec<Item>> {
        let value = self.prompter.validate(by.label())?;
        let items = match by {
            SearchBy::Name => self.repository.search_by_name(&value)?,
            SearchBy::Brand => self.repository.search_by_brand(&value)?,
            SearchBy::Category => self.repository.search_by_category(&value)?,
            SearchBy::Sku => self.repository.search_by_sku(&value)?.into_iter().collect(),
        };
        debug!(field = %by.field(), value = %value, found = items.len(), "search finished");

        for item in &items {
            self.show(item)?;
        }
        if self.mode == OutputMode::Text {
            writeln!(self.out(), "total items found: {}", items.len())
                .map_err(ServiceError::Output)?;
        }
        Ok(items)
    }

    /// Prompts for a SKU and an amount and adds it to or subtracts it from
    /// the item's stock.
    ///
    /// The stock count may go negative.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown SKU and
    /// [`ServiceError::AmountOverflow`] when the result leaves the `i64` range.
    pub fn adjust(&mut self, adjustment: Adjustment) -> Result<Item> {
        let sku = self.prompter.validate("SKU")?;
        let delta = self.prompter.validate_integer(adjustment.label())?;

        let mut item = self.find(&sku)?;
        item.amount = adjustment
            .apply(item.amount, delta)
            .ok_or_else(|| ServiceError::AmountOverflow { sku: sku.clone() })?;
        if item.amount < 0 {
            warn!(sku = %item.sku, amount = item.amount, "stock count is negative");
        }

        self.repository.update(&item)?;
        info!(sku = %item.sku, ?adjustment, delta, amount = item.amount, "stock adjusted");
        self.show(&item)?;
        Ok(item)
    }

    /// Prompts for a SKU, then for every field with its current value as the
    /// default, and overwrites the item.
    ///
    /// Blank answers keep the current value, so an all-blank run leaves the
    /// item unchanged.
    pub fn update(&mut self) -> Result<Item> {
        let sku = self.prompter.validate("SKU of item to update")?;
        let (id, mut fields) = self.find(&sku)?.into_parts();

        for spec in &ITEM_FIELDS {
            let current = fields.get(spec.field);
            let value = self.prompter.read_field_or(spec, current)?;
            fields.set(spec.field, value)?;
        }

        let item = Item::from_parts(id, fields);
        self.repository.update(&item)?;
        info!(id, sku = %item.sku, "item updated");

        if self.mode == OutputMode::Text {
            writeln!(self.out(), "Item updated:").map_err(ServiceError::Output)?;
        }
        self.show(&item)?;
        Ok(item)
    }

    /// Prompts for a SKU and deletes the item, returning the SKU.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if no item had the SKU.
    pub fn delete(&mut self) -> Result<String> {
        let sku = self.prompter.validate("SKU of item to delete")?;
        if self.repository.delete(&sku)? == 0 {
            return Err(ServiceError::NotFound(sku));
        }
        info!(sku = %sku, "item deleted");

        if self.mode == OutputMode::Text {
            writeln!(self.out(), "item deleted: {}", sku.to_uppercase())
                .map_err(ServiceError::Output)?;
        }
        Ok(sku)
    }

    fn find(&self, sku: &str) -> Result<Item> {
        self.repository
            .search_by_sku(sku)?
            .ok_or_else(|| ServiceError::NotFound(sku.to_string()))
    }

    fn show(&mut self, item: &Item) -> Result<()> {
        let mode = self.mode;
        let out = self.out();
        let written = match mode {
            OutputMode::Text => writeln!(out, "{}", format_item(item)),
            OutputMode::Json => serde_json::to_writer(&mut *out, item)
                .map_err(io::Error::from)
                .and_then(|()| writeln!(out)),
        };
        written.map_err(ServiceError::Output)
    }

    fn out(&mut self) -> &mut W {
        &mut self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::prompt::PromptPolicy;
    use std::io::Cursor;
    use std::time::Duration;
    use stockroom_core::{DeadlineExceeded, RepositoryError, StorageError};

    /// In-memory repository with the same uniqueness rule as the SQL table.
    #[derive(Default)]
    struct MemoryRepository {
        items: Vec<Item>,
        next_id: i64,
        writes: usize,
        timed_out: bool,
    }

    impl MemoryRepository {
        fn with(items: &[NewItem]) -> Self {
            let mut repo = Self::default();
            for item in items {
                repo.create(item).unwrap();
            }
            repo.writes = 0;
            repo
        }

        fn check(&self, context: &str) -> std::result::Result<(), RepositoryError> {
            if self.timed_out {
                return Err(StorageError::new(
                    context,
                    DeadlineExceeded {
                        timeout: Duration::from_secs(5),
                    },
                )
                .into());
            }
            Ok(())
        }

        fn matching(&self, pred: impl Fn(&Item) -> bool) -> Vec<Item> {
            self.items.iter().filter(|i| pred(i)).cloned().collect()
        }
    }

    impl ItemRepository for MemoryRepository {
        fn create(&mut self, item: &NewItem) -> std::result::Result<Item, RepositoryError> {
            self.check("insert item")?;
            if self.items.iter().any(|i| i.sku == item.sku) {
                return Err(RepositoryError::DuplicateSku(item.sku.clone()));
            }
            self.next_id += 1;
            self.writes += 1;
            let stored = item.clone().into_item(self.next_id);
            self.items.push(stored.clone());
            Ok(stored)
        }

        fn search_by_name(&self, name: &str) -> std::result::Result<Vec<Item>, RepositoryError> {
            self.check("search items by name")?;
            Ok(self.matching(|i| i.name == name))
        }

        fn search_by_brand(&self, brand: &str) -> std::result::Result<Vec<Item>, RepositoryError> {
            self.check("search items by brand")?;
            Ok(self.matching(|i| i.brand == brand))
        }

        fn search_by_category(
            &self,
            category: &str,
        ) -> std::result::Result<Vec<Item>, RepositoryError> {
            self.check("search items by category")?;
            Ok(self.matching(|i| i.category == category))
        }

        fn search_by_sku(&self, sku: &str) -> std::result::Result<Option<Item>, RepositoryError> {
            self.check("search item by sku")?;
            Ok(self.items.iter().find(|i| i.sku == sku).cloned())
        }

        fn update(&mut self, item: &Item) -> std::result::Result<(), RepositoryError> {
            self.check("update item")?;
            if self.items.iter().any(|i| i.sku == item.sku && i.id != item.id) {
                return Err(RepositoryError::DuplicateSku(item.sku.clone()));
            }
            self.writes += 1;
            if let Some(slot) = self.items.iter_mut().find(|i| i.id == item.id) {
                *slot = item.clone();
            }
            Ok(())
        }

        fn delete(&mut self, sku: &str) -> std::result::Result<usize, RepositoryError> {
            self.check("delete item")?;
            self.writes += 1;
            let before = self.items.len();
            self.items.retain(|i| i.sku != sku);
            Ok(before - self.items.len())
        }
    }

    type TestService = InventoryService<MemoryRepository, Cursor<Vec<u8>>, Vec<u8>, Vec<u8>>;

    fn service(repo: MemoryRepository, input: &str) -> TestService {
        let prompter = Prompter::with_policy(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            PromptPolicy::default(),
        );
        InventoryService::new(repo, prompter, Vec::new())
    }

    fn prompts(service: &TestService) -> String {
        String::from_utf8(service.prompter().output().clone()).unwrap()
    }

    fn output(service: &TestService) -> String {
        String::from_utf8(service.output().clone()).unwrap()
    }

    fn iphone() -> NewItem {
        NewItem::new("iphone 12 pro", "apple", "aap12p21", "phone", "storage room", 2)
    }

    const IPHONE_LINE: &str =
        "[AAP12P21] Name: Iphone 12 Pro | Brand: Apple | Category: Phone | location: STORAGE ROOM | Stock: 2";

    #[test]
    fn test_create_prompts_every_field_in_order() {
        let input = "iPhone 12 Pro\nApple\nAAP12P21\nPhone\nStorage Room\n2\n";
        let mut svc = service(MemoryRepository::default(), input);

        let item = svc.create().unwrap();
        assert_eq!(item.fields(), iphone());
        assert_eq!(
            prompts(&svc),
            "Name: Brand: Stock Keeping Unit(SKU): Category: Location: Amount: "
        );
        assert_eq!(output(&svc), format!("{IPHONE_LINE}\n"));
        assert_eq!(svc.repository().writes, 1);
    }

    #[test]
    fn test_create_retries_blank_field_once() {
        let input = "iphone 12 pro\n\napple\naap12p21\nphone\nstorage room\n2\n";
        let mut svc = service(MemoryRepository::default(), input);
        assert_eq!(svc.create().unwrap().brand, "apple");
    }

    #[test]
    fn test_create_stops_when_retries_exhausted() {
        let input = "iphone 12 pro\n\n\napple\n";
        let mut svc = service(MemoryRepository::default(), input);
        let err = svc.create().unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InputExhausted { ref field, .. }) if field == "Brand"
        ));
        assert_eq!(svc.repository().writes, 0);
    }

    #[test]
    fn test_create_duplicate_sku() {
        let input = "galaxy\nsamsung\naap12p21\nphone\nshelf\n1\n";
        let mut svc = service(MemoryRepository::with(&[iphone()]), input);
        let err = svc.create().unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateSku(ref s) if s == "aap12p21"));
        assert_eq!(svc.repository().items[0].fields(), iphone());
    }

    #[test]
    fn test_create_rejects_non_numeric_amount() {
        let input = "iphone\napple\naap1\nphone\nshelf\nmany\n";
        let mut svc = service(MemoryRepository::default(), input);
        assert!(matches!(
            svc.create().unwrap_err(),
            ServiceError::Validation(ValidationError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_search_prints_items_and_total() {
        let galaxy = NewItem::new("galaxy s21", "samsung", "sgs21", "phone", "shelf a", 7);
        let mut svc = service(MemoryRepository::with(&[iphone(), galaxy]), "Phone\n");

        let items = svc.search(SearchBy::Category).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(prompts(&svc), "Search Category: ");
        let out = output(&svc);
        assert!(out.starts_with(IPHONE_LINE));
        assert!(out.contains("[SGS21] Name: Galaxy S21"));
        assert!(out.ends_with("total items found: 2\n"));
    }

    #[test]
    fn test_search_without_match_is_empty() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "dell\n");
        assert!(svc.search(SearchBy::Brand).unwrap().is_empty());
        assert!(output(&svc).ends_with("total items found: 0\n"));
    }

    #[test]
    fn test_search_by_sku_missing_is_empty_not_error() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "nope\n");
        assert!(svc.search(SearchBy::Sku).unwrap().is_empty());
    }

    #[test]
    fn test_search_by_sku_finds_one() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "AAP12P21\n");
        let items = svc.search(SearchBy::Sku).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(prompts(&svc), "Search SKU code: ");
        assert_eq!(output(&svc), format!("{IPHONE_LINE}\ntotal items found: 1\n"));
    }

    #[test]
    fn test_json_mode_writes_one_object_per_line() {
        let mut svc =
            service(MemoryRepository::with(&[iphone()]), "apple\n").with_output_mode(OutputMode::Json);
        svc.search(SearchBy::Brand).unwrap();

        assert_eq!(prompts(&svc), "Search Brand: ");
        let out = output(&svc);
        assert_eq!(out.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["sku"], "aap12p21");
        assert_eq!(value["amount"], 2);
    }

    #[test]
    fn test_add_increases_stock() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "aap12p21\n3\n");
        let item = svc.adjust(Adjustment::Add).unwrap();
        assert_eq!(item.amount, 5);
        assert_eq!(svc.repository().items[0].amount, 5);
        assert_eq!(prompts(&svc), "SKU: Amount to add: ");
        assert!(output(&svc).contains("Stock: 5"));
    }

    #[test]
    fn test_subtract_may_go_negative() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "aap12p21\n5\n");
        let item = svc.adjust(Adjustment::Subtract).unwrap();
        assert_eq!(item.amount, -3);
        assert!(output(&svc).contains("Stock: -3"));
    }

    #[test]
    fn test_adjust_rejects_non_numeric_amount() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "aap12p21\nthree\n");
        let err = svc.adjust(Adjustment::Add).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidNumber { ref field, .. }) if field == "Amount to add"
        ));
        assert_eq!(svc.repository().writes, 0);
    }

    #[test]
    fn test_adjust_unknown_sku_is_not_found() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "gp7\n1\n");
        let err = svc.adjust(Adjustment::Add).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref s) if s == "gp7"));
        assert_eq!(svc.repository().writes, 0);
    }

    #[test]
    fn test_adjust_overflow_is_rejected() {
        let mut item = iphone();
        item.amount = i64::MAX;
        let mut svc = service(MemoryRepository::with(&[item]), "aap12p21\n1\n");
        let err = svc.adjust(Adjustment::Add).unwrap_err();
        assert!(matches!(err, ServiceError::AmountOverflow { ref sku } if sku == "aap12p21"));
        assert_eq!(svc.repository().items[0].amount, i64::MAX);
    }

    #[test]
    fn test_update_blank_answers_keep_item() {
        let repo = MemoryRepository::with(&[iphone()]);
        let before = repo.items[0].clone();
        let mut svc = service(repo, "aap12p21\n\n\n\n\n\n\n");

        let after = svc.update().unwrap();
        assert_eq!(after, before);
        assert_eq!(svc.repository().items[0], before);
        let asked = prompts(&svc);
        assert!(asked.contains("Name [ iphone 12 pro ]: "));
        assert!(asked.contains("Amount [ 2 ]: "));
        assert_eq!(output(&svc), format!("Item updated:\n{IPHONE_LINE}\n"));
    }

    #[test]
    fn test_update_changes_sku_and_amount_keeping_id() {
        let repo = MemoryRepository::with(&[iphone()]);
        let id = repo.items[0].id;
        let mut svc = service(repo, "aap12p21\n\n\nAAP12P22\n\nfront desk\n9\n");

        let item = svc.update().unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.sku, "aap12p22");
        assert_eq!(item.location, "front desk");
        assert_eq!(item.amount, 9);
        assert_eq!(svc.repository().items, vec![item]);
    }

    #[test]
    fn test_update_unknown_sku_is_not_found() {
        let mut svc = service(MemoryRepository::default(), "gp7\n");
        assert!(matches!(svc.update().unwrap_err(), ServiceError::NotFound(_)));
    }

    #[test]
    fn test_update_collision_is_duplicate() {
        let galaxy = NewItem::new("galaxy s21", "samsung", "sgs21", "phone", "shelf a", 7);
        let mut svc = service(
            MemoryRepository::with(&[iphone(), galaxy]),
            "sgs21\n\n\naap12p21\n\n\n\n",
        );
        assert!(matches!(svc.update().unwrap_err(), ServiceError::DuplicateSku(_)));
    }

    #[test]
    fn test_delete_prints_confirmation() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "aap12p21\n");
        assert_eq!(svc.delete().unwrap(), "aap12p21");
        assert!(svc.repository().items.is_empty());
        assert_eq!(prompts(&svc), "SKU of item to delete: ");
        assert_eq!(output(&svc), "item deleted: AAP12P21\n");
    }

    #[test]
    fn test_delete_unknown_sku_is_not_found() {
        let mut svc = service(MemoryRepository::with(&[iphone()]), "gp7\n");
        assert!(matches!(svc.delete().unwrap_err(), ServiceError::NotFound(ref s) if s == "gp7"));
        assert_eq!(svc.repository().items.len(), 1);
    }

    #[test]
    fn test_storage_timeout_is_reported() {
        let mut repo = MemoryRepository::with(&[iphone()]);
        repo.timed_out = true;
        let mut svc = service(repo, "apple\n");
        let err = svc.search(SearchBy::Brand).unwrap_err();
        assert!(err.is_timeout());
    }
}
