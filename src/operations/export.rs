use crate::client::{VkClient, VkClientError};
use crate::models::WallPost;
use crate::operations::collect::collect_posts_with_comments;
use crate::operations::comments::{collect_comment_rows, CommentRow, NameCache};
use log::{info, warn};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::fmt;
use std::path::Path;

/// Number of posts processed and checkpointed per output file.
pub const BATCH_SIZE: usize = 50;

/// Header labels of every exported spreadsheet.
pub const EXPORT_HEADER: [&str; 4] = ["User ID", "First Name", "Last Name", "Comment"];

#[derive(Debug)]
pub enum ExportError {
    Client(VkClientError),
    Workbook(XlsxError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportError::Client(err) => write!(f, "Client error: {}", err),
            ExportError::Workbook(err) => write!(f, "Workbook error: {}", err),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<VkClientError> for ExportError {
    fn from(err: VkClientError) -> Self {
        ExportError::Client(err)
    }
}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        ExportError::Workbook(err)
    }
}

/// Configuration options for a comment export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Domain name of the community whose wall is scraped
    pub group_domain: String,
    /// Number of posts with comments to process
    pub post_count: usize,
    /// Combined output filename (defaults to `<domain>_comment_users.xlsx`)
    pub filename: Option<String>,
}

/// Result of an export run
#[derive(Debug)]
pub struct ExportResult {
    /// The number of posts that were processed
    pub post_count: usize,
    /// The number of comment rows written to the combined file
    pub row_count: usize,
    /// The number of batch files written
    pub batch_count: usize,
    /// Path of the combined output file (None when nothing was exported)
    pub combined_file: Option<String>,
}

/// Operation for exporting a community's commenters to spreadsheets
pub struct ExportOperation {
    /// Configuration options for the operation
    options: ExportOptions,
    /// VK client for API interactions
    client: VkClient,
}

impl ExportOperation {
    /// Create a new export operation with the provided options and client
    pub fn new(options: ExportOptions, client: VkClient) -> Self {
        Self { options, client }
    }

    /// Execute the export operation.
    ///
    /// Resolution of the community ID is the only fatal failure; everything
    /// downstream degrades per-post or per-comment with a logged warning.
    pub async fn execute(&self) -> Result<ExportResult, ExportError> {
        let group_id = self.client.fetch_group_id(&self.options.group_domain).await?;
        info!(
            "Resolved group '{}' to ID {}",
            self.options.group_domain, group_id
        );

        let posts =
            collect_posts_with_comments(&self.client, group_id, self.options.post_count).await;

        if posts.is_empty() {
            warn!("No posts with comments fetched for processing.");
            return Ok(ExportResult {
                post_count: 0,
                row_count: 0,
                batch_count: 0,
                combined_file: None,
            });
        }

        let filename = self
            .options
            .filename
            .clone()
            .unwrap_or_else(|| format!("{}_comment_users.xlsx", self.options.group_domain));

        let batches = chunk_posts(&posts, BATCH_SIZE);
        let mut all_rows: Vec<CommentRow> = Vec::new();
        let mut cache = NameCache::new();

        for (index, batch) in batches.iter().enumerate() {
            let batch_num = index + 1;
            info!("Processing batch {}/{}", batch_num, batches.len());

            let post_ids: Vec<i64> = batch.iter().map(|post| post.id).collect();
            let rows = collect_comment_rows(&self.client, group_id, &post_ids, &mut cache).await;

            write_rows(&rows, format!("{}_{}.xlsx", filename, batch_num))?;
            all_rows.extend(rows);
        }

        write_rows(&all_rows, &filename)?;
        info!(
            "Saved {} comment rows from group '{}' to {}",
            all_rows.len(),
            self.options.group_domain,
            filename
        );

        Ok(ExportResult {
            post_count: posts.len(),
            row_count: all_rows.len(),
            batch_count: batches.len(),
            combined_file: Some(filename),
        })
    }
}

/// Split posts into consecutive batches of at most `size`, preserving order.
pub fn chunk_posts(posts: &[WallPost], size: usize) -> Vec<&[WallPost]> {
    posts.chunks(size).collect()
}

/// Write comment rows to an .xlsx file with the fixed header row.
///
/// Creates or overwrites the file; rows keep their input order.
pub fn write_rows<P: AsRef<Path>>(rows: &[CommentRow], path: P) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, label) in EXPORT_HEADER.iter().enumerate() {
        worksheet.write_string(0, col as u16, *label)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = (index + 1) as u32;
        worksheet.write_number(r, 0, row.user_id as f64)?;
        worksheet.write_string(r, 1, &row.first_name)?;
        worksheet.write_string(r, 2, &row.last_name)?;
        worksheet.write_string(r, 3, &row.text)?;
    }

    workbook.save(path)?;
    Ok(())
}
