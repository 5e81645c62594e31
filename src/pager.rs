//! File-backed page cache. Pages are materialized lazily into a fixed-size
//! slot array and flushed back to disk explicitly; there is no eviction
//! because the slot array's capacity equals the whole addressable space.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use heapless::Vec as HVec;
use tracing::{debug, info};

use crate::errors::Error;
use crate::node::{Page, PAGE_SIZE};

pub const TABLE_MAX_PAGES: usize = 100;

pub struct Pager {
    file: File,
    pub num_pages: u32,
    pages: HVec<Option<Box<Page>>, TABLE_MAX_PAGES>,
}

impl Pager {
    pub fn open(path: &str) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(Error::CorruptFile(
                "Db file is not a whole number of pages. Corrupt file.".to_owned(),
            ));
        }
        let num_pages = (file_length / PAGE_SIZE as u64) as u32;

        let mut pages = HVec::new();
        for _ in 0..TABLE_MAX_PAGES {
            let _ = pages.push(None);
        }

        info!(path, num_pages, "opened database file");
        Ok(Pager {
            file,
            num_pages,
            pages,
        })
    }

    pub fn get_page(&mut self, page_num: u32) -> Result<&mut Page, Error> {
        if page_num as usize >= TABLE_MAX_PAGES {
            return Err(Error::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES as u32,
            });
        }

        if self.pages[page_num as usize].is_none() {
            let mut page = Page::zeroed();
            if page_num < self.num_pages {
                let offset = page_num as u64 * PAGE_SIZE as u64;
                self.file.seek(SeekFrom::Start(offset))?;
                self.file.read_exact(page.as_bytes_mut())?;
            }
            self.pages[page_num as usize] = Some(Box::new(page));
            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
            debug!(page_num, "materialized page");
        }

        Ok(self.pages[page_num as usize].as_mut().unwrap())
    }

    /// Splits always append; the pager never reuses a freed slot.
    pub fn get_unused_page_num(&self) -> u32 {
        self.num_pages
    }

    pub fn flush(&mut self, page_num: u32) -> Result<(), Error> {
        let page = self.pages[page_num as usize]
            .as_ref()
            .ok_or_else(|| Error::CorruptFile(format!("Tried to flush absent page {page_num}")))?;

        let offset = page_num as u64 * PAGE_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_bytes())?;
        Ok(())
    }

    /// Materializes both pages, then hands out simultaneous mutable access —
    /// needed while redistributing cells across a split leaf and its new
    /// sibling, or while copying the old root into a freshly allocated child.
    pub fn get_two_pages_mut(
        &mut self,
        a: u32,
        b: u32,
    ) -> Result<(&mut Page, &mut Page), Error> {
        debug_assert_ne!(a, b);
        self.get_page(a)?;
        self.get_page(b)?;

        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let slice: &mut [Option<Box<Page>>] = &mut self.pages;
        let (left, right) = slice.split_at_mut(hi as usize);
        let lo_page = left[lo as usize].as_mut().unwrap();
        let hi_page = right[0].as_mut().unwrap();

        if a < b {
            Ok((lo_page, hi_page))
        } else {
            Ok((hi_page, lo_page))
        }
    }

    pub fn close(&mut self) -> Result<(), Error> {
        for i in 0..self.num_pages {
            if self.pages[i as usize].is_some() {
                self.flush(i)?;
                self.pages[i as usize] = None;
            }
        }
        self.file.flush()?;
        info!(num_pages = self.num_pages, "closed database file");
        Ok(())
    }
}
