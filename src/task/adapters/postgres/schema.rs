//! Diesel schema for board task persistence.

diesel::table! {
    /// Boards, read only for ownership checks.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Owning user.
        owner_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records with their column position.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Creator and owner.
        owner_id -> Uuid,
        /// Task title.
        title -> Text,
        /// Optional description.
        description -> Nullable<Text>,
        /// Status column.
        #[max_length = 20]
        status -> Varchar,
        /// Dense rank within the `(board_id, status)` column.
        position -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(tasks -> boards (board_id));
diesel::allow_tables_to_appear_in_same_query!(boards, tasks);
