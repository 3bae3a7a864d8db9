use uuid::Uuid;

/// The part of a table schema the key codec cares about.
///
/// A nil co-table id means the table owns its keyspace and its keys carry
/// no table id prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    cotable_id: Uuid,
    num_hash_key_columns: usize,
    num_range_key_columns: usize,
}

impl Schema {
    pub fn new(num_hash_key_columns: usize, num_range_key_columns: usize) -> Self {
        Schema {
            cotable_id: Uuid::nil(),
            num_hash_key_columns,
            num_range_key_columns,
        }
    }

    pub fn with_cotable_id(mut self, cotable_id: Uuid) -> Self {
        self.cotable_id = cotable_id;
        self
    }

    pub fn cotable_id(&self) -> &Uuid {
        &self.cotable_id
    }

    pub fn has_cotable_id(&self) -> bool {
        !self.cotable_id.is_nil()
    }

    pub fn num_hash_key_columns(&self) -> usize {
        self.num_hash_key_columns
    }

    pub fn num_range_key_columns(&self) -> usize {
        self.num_range_key_columns
    }
}
