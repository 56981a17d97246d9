use crate::entities::{Dress, DressKind};
use crate::handlers::{add_unique, search, view, Handler, Opcode, RequestError};
use crate::reply::Reply;
use crate::store::Store;

/// Add, view, search and count for one kind of dress. Each kind has its own file, so the two
/// managers never see each other's records.
#[derive(Debug, PartialEq)]
pub struct DressManager {
    kind: DressKind,
}

impl DressManager {
    pub fn stitched() -> DressManager {
        DressManager {
            kind: DressKind::Stitched,
        }
    }

    pub fn unstitched() -> DressManager {
        DressManager {
            kind: DressKind::Unstitched,
        }
    }

    fn add(&self, payload: &str, store: &Store) -> Result<Reply, RequestError> {
        let dress = Dress::parse(self.kind, payload)?;
        add_unique(store, self.kind.table(), &dress)?;

        Ok(Reply::Success(format!(
            "{} dress added successfully (ID: {})",
            self.adjective(),
            dress.id
        )))
    }

    fn count(&self, store: &Store) -> Result<Reply, RequestError> {
        let count = store.lock().count_non_empty_lines(self.kind.table())?;
        Ok(Reply::Count {
            label: self.label(),
            count,
        })
    }

    fn adjective(&self) -> &'static str {
        match self.kind {
            DressKind::Stitched => "Stitched",
            DressKind::Unstitched => "Unstitched",
        }
    }

    fn label(&self) -> &'static str {
        match self.kind {
            DressKind::Stitched => "Stitched Dresses",
            DressKind::Unstitched => "Unstitched Dresses",
        }
    }

    fn title(&self) -> &'static str {
        match self.kind {
            DressKind::Stitched => "STITCHED DRESSES",
            DressKind::Unstitched => "UNSTITCHED DRESSES",
        }
    }
}

impl Handler for DressManager {
    fn handle(&self, opcode: Opcode, payload: &str, store: &Store) -> Result<Reply, RequestError> {
        use DressKind::*;
        use Opcode::*;

        match (self.kind, opcode) {
            (Stitched, AddStitched) | (Unstitched, AddUnstitched) => self.add(payload, store),
            (Stitched, ViewStitched) | (Unstitched, ViewUnstitched) => {
                view(store, self.kind.table(), self.title())
            }
            (Stitched, SearchStitched) | (Unstitched, SearchUnstitched) => {
                search(store, self.kind.table(), payload, "Dress")
            }
            (Stitched, CountStitched) | (Unstitched, CountUnstitched) => self.count(store),
            (Stitched, _) => Err(RequestError::UnknownOperation("stitched dress")),
            (Unstitched, _) => Err(RequestError::UnknownOperation("unstitched dress")),
        }
    }
}
